use std::collections::HashSet;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    access::{Unlock, has_course_access},
    repository::{self, ChapterRow, CourseRow, FindCourse, TopicRow},
};

/// A published topic, or a virtual one synthesized for chapters without a topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicGroup<T> {
    pub id: Option<String>,
    pub title: String,
    pub is_virtual: bool,
    pub chapters: Vec<T>,
}

impl<T> TopicGroup<T> {
    fn virtual_topic(title: &str, chapters: Vec<T>) -> Self {
        Self {
            id: None,
            title: title.to_owned(),
            is_virtual: true,
            chapters,
        }
    }
}

/// Arranges ordered chapters under the course's topics.
///
/// A course without any topic gets exactly one virtual topic, titled after the
/// course, holding every chapter. Otherwise each published topic keeps its
/// chapters in order, chapters without a topic are collected into one
/// trailing virtual topic, and chapters of unpublished topics are dropped.
/// The result is never empty.
pub fn group_by_topic<T>(
    course_title: &str,
    topics: &[TopicRow],
    chapters: Vec<T>,
    topic_of: impl Fn(&T) -> Option<&str>,
) -> Vec<TopicGroup<T>> {
    if topics.is_empty() {
        return vec![TopicGroup::virtual_topic(course_title, chapters)];
    }

    let mut groups = topics
        .iter()
        .filter(|topic| topic.is_published)
        .map(|topic| TopicGroup {
            id: Some(topic.id.to_owned()),
            title: topic.title.to_owned(),
            is_virtual: false,
            chapters: vec![],
        })
        .collect::<Vec<_>>();

    let mut loose = vec![];

    for chapter in chapters {
        let Some(topic_id) = topic_of(&chapter) else {
            loose.push(chapter);
            continue;
        };

        if let Some(group) = groups
            .iter_mut()
            .find(|group| group.id.as_deref() == Some(topic_id))
        {
            group.chapters.push(chapter);
        }
    }

    if !loose.is_empty() || groups.is_empty() {
        groups.push(TopicGroup::virtual_topic(course_title, loose));
    }

    groups
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterItem {
    pub id: String,
    pub title: String,
    pub position: i64,
    pub topic_id: Option<String>,
    pub is_free: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub unlock_at: Option<OffsetDateTime>,
    pub is_locked: bool,
    pub unlock: Option<Unlock>,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i64>,
    pub category_id: Option<String>,
    pub has_purchase: bool,
    pub has_access: bool,
    pub progress: u8,
    pub topics: Vec<TopicGroup<ChapterItem>>,
}

/// Published course with the published chapters a student may see, in reading order.
pub(crate) struct Outline {
    pub course: CourseRow,
    pub has_purchase: bool,
    pub groups: Vec<TopicGroup<ChapterRow>>,
}

impl Outline {
    pub fn chapters(&self) -> impl Iterator<Item = &ChapterRow> {
        self.groups.iter().flat_map(|group| group.chapters.iter())
    }
}

impl super::Query {
    pub(crate) async fn outline(
        &self,
        user_id: &str,
        course_id: impl Into<String>,
    ) -> pensum_shared::Result<Outline> {
        let Some(course) =
            repository::find_course(&self.read_db, FindCourse::Published(course_id.into()))
                .await?
        else {
            pensum_shared::not_found!("course");
        };

        let topics = repository::list_topics(&self.read_db, &course.id).await?;
        let chapters = repository::list_visible_chapters(&self.read_db, &course.id).await?;
        let has_purchase = repository::has_purchase(&self.read_db, user_id, &course.id).await?;
        let groups = group_by_topic(&course.title, &topics, chapters, |chapter| {
            chapter.topic_id.as_deref()
        });

        Ok(Outline {
            course,
            has_purchase,
            groups,
        })
    }

    pub async fn course_detail(
        &self,
        user_id: impl Into<String>,
        course_id: impl Into<String>,
        now: OffsetDateTime,
    ) -> pensum_shared::Result<CourseDetail> {
        let user_id = user_id.into();
        let outline = self.outline(&user_id, course_id).await?;
        let completed: HashSet<String> = self
            .progress
            .completed_chapter_ids(&user_id, &outline.course.id)
            .await?;
        let progress = self
            .progress
            .get_progress(&user_id, &outline.course.id)
            .await?;

        let Outline {
            course,
            has_purchase,
            groups,
        } = outline;

        let topics = groups
            .into_iter()
            .map(|group| TopicGroup {
                id: group.id,
                title: group.title,
                is_virtual: group.is_virtual,
                chapters: group
                    .chapters
                    .into_iter()
                    .map(|chapter| {
                        let access = chapter.access(has_purchase, course.price).decide(now);

                        ChapterItem {
                            is_completed: completed.contains(&chapter.id),
                            unlock_at: chapter.unlock_at(),
                            is_locked: access.is_locked(),
                            unlock: access.unlock(),
                            id: chapter.id,
                            title: chapter.title,
                            position: chapter.position,
                            topic_id: chapter.topic_id,
                            is_free: chapter.is_free,
                        }
                    })
                    .collect(),
            })
            .collect();

        Ok(CourseDetail {
            has_access: has_course_access(has_purchase, course.price),
            id: course.id,
            title: course.title,
            description: course.description,
            image_url: course.image_url,
            price: course.price,
            category_id: course.category_id,
            has_purchase,
            progress,
            topics,
        })
    }
}
