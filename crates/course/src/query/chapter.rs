use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    access::{Access, Unlock},
    gate::{CompletionGate, Resource},
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterView {
    pub id: String,
    pub course_id: String,
    pub topic_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub google_form_url: Option<String>,
    pub position: i64,
    pub is_free: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub unlock_at: Option<OffsetDateTime>,
    pub is_locked: bool,
    pub unlock: Option<Unlock>,
    pub is_completed: bool,
    pub gate: CompletionGate,
    pub outstanding: Vec<Resource>,
    pub next_chapter_id: Option<String>,
    pub has_purchase: bool,
    pub progress: u8,
}

impl super::Query {
    /// A visible chapter of a published course. Learning material is withheld
    /// while the chapter is locked.
    pub async fn chapter_view(
        &self,
        user_id: impl Into<String>,
        course_id: impl Into<String>,
        chapter_id: impl Into<String>,
        now: OffsetDateTime,
    ) -> pensum_shared::Result<ChapterView> {
        let user_id = user_id.into();
        let chapter_id = chapter_id.into();
        let outline = self.outline(&user_id, course_id).await?;

        let mut chapters = outline.chapters();
        let Some(chapter) = chapters.by_ref().find(|chapter| chapter.id == chapter_id) else {
            pensum_shared::not_found!("chapter");
        };
        let next_chapter_id = chapters.next().map(|next| next.id.to_owned());

        let access = chapter
            .access(outline.has_purchase, outline.course.price)
            .decide(now);
        let is_locked = access.is_locked();

        let gate = CompletionGate::for_urls(
            chapter.pdf_url.as_deref(),
            chapter.google_form_url.as_deref(),
        );

        let completed = self
            .progress
            .completed_chapter_ids(&user_id, &outline.course.id)
            .await?;
        let progress = self
            .progress
            .get_progress(&user_id, &outline.course.id)
            .await?;

        let material = |url: &Option<String>| if is_locked { None } else { url.clone() };

        tracing::debug!(
            user_id = %user_id,
            chapter_id = %chapter.id,
            is_locked,
            unlock = ?access.unlock(),
            "chapter access decided"
        );

        Ok(ChapterView {
            id: chapter.id.to_owned(),
            course_id: chapter.course_id.to_owned(),
            topic_id: chapter.topic_id.to_owned(),
            title: chapter.title.to_owned(),
            description: chapter.description.to_owned(),
            video_url: material(&chapter.video_url),
            pdf_url: material(&chapter.pdf_url),
            google_form_url: material(&chapter.google_form_url),
            position: chapter.position,
            is_free: chapter.is_free,
            unlock_at: chapter.unlock_at(),
            is_locked,
            unlock: access.unlock(),
            is_completed: completed.contains(&chapter.id),
            outstanding: gate.outstanding(),
            gate,
            next_chapter_id,
            has_purchase: outline.has_purchase,
            progress,
        })
    }

    /// Access decision for a chapter the student can see. Hidden or
    /// unpublished chapters are reported as missing.
    pub async fn chapter_access(
        &self,
        user_id: impl Into<String>,
        course_id: impl Into<String>,
        chapter_id: impl Into<String>,
        now: OffsetDateTime,
    ) -> pensum_shared::Result<Access> {
        let user_id = user_id.into();
        let chapter_id = chapter_id.into();
        let outline = self.outline(&user_id, course_id).await?;

        let Some(chapter) = outline.chapters().find(|chapter| chapter.id == chapter_id) else {
            pensum_shared::not_found!("chapter");
        };

        Ok(chapter
            .access(outline.has_purchase, outline.course.price)
            .decide(now))
    }

    /// Stores the completion flag of an unlocked chapter and returns the new
    /// course percentage.
    pub async fn set_chapter_completion(
        &self,
        user_id: impl Into<String>,
        course_id: impl Into<String>,
        chapter_id: impl Into<String>,
        is_completed: bool,
        now: OffsetDateTime,
    ) -> pensum_shared::Result<u8> {
        let user_id = user_id.into();
        let course_id = course_id.into();
        let chapter_id = chapter_id.into();

        let access = self
            .chapter_access(&user_id, &course_id, &chapter_id, now)
            .await?;

        if access.is_locked() {
            tracing::warn!(
                user_id = %user_id,
                chapter_id = %chapter_id,
                "completion rejected on a locked chapter"
            );

            return Err(pensum_shared::Error::Forbidden);
        }

        self.progress
            .set_chapter_completion(&user_id, &chapter_id, is_completed)
            .await?;

        self.progress.get_progress(&user_id, &course_id).await
    }
}
