use pensum_db::table::{Chapter, UserProgress};
use pensum_shared::Identity;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Deserialize;
use time::OffsetDateTime;
use validator::Validate;

use crate::repository::{self, ChapterRow, PositionOf};

use super::{PositionInput, check_url, normalize, patch, patch_datetime};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChapterInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub topic_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChapterInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "patch")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch")]
    pub video_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch")]
    pub pdf_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch")]
    pub google_form_url: Option<Option<String>>,
    pub is_free: Option<bool>,
    #[serde(default, deserialize_with = "patch_datetime")]
    pub unlock_at: Option<Option<OffsetDateTime>>,
    #[serde(default, deserialize_with = "patch")]
    pub topic_id: Option<Option<String>>,
}

impl super::Command {
    /// Appends the chapter after the last one of the course, unpublished.
    pub async fn create_chapter(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        input: CreateChapterInput,
    ) -> pensum_shared::Result<String> {
        let course = self.owned_course(identity, course_id).await?;
        input.validate()?;

        let title = input.title.trim().to_owned();
        if title.is_empty() {
            pensum_shared::bail!("title is required");
        }

        let topic_id = normalize(input.topic_id);
        if let Some(topic_id) = &topic_id {
            if repository::find_topic(&self.write_db, &course.id, topic_id)
                .await?
                .is_none()
            {
                pensum_shared::not_found!("topic");
            }
        }

        let id = pensum_shared::new_id();
        let now = pensum_shared::unix_now();
        let position =
            repository::next_position(&self.write_db, PositionOf::Chapter, &course.id).await?;

        let statement = Query::insert()
            .into_table(Chapter::Table)
            .columns([
                Chapter::Id,
                Chapter::CourseId,
                Chapter::TopicId,
                Chapter::Title,
                Chapter::Position,
                Chapter::IsFree,
                Chapter::IsPublished,
                Chapter::CreatedAt,
                Chapter::UpdatedAt,
            ])
            .values_panic([
                id.to_owned().into(),
                course.id.to_owned().into(),
                topic_id.into(),
                title.into(),
                position.into(),
                false.into(),
                false.into(),
                now.into(),
                now.into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        tracing::info!(course_id = %course.id, chapter_id = %id, position, "chapter created");

        Ok(id)
    }

    pub async fn update_chapter(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        chapter_id: impl Into<String>,
        input: UpdateChapterInput,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        let chapter = self.owned_chapter(&course.id, chapter_id).await?;
        input.validate()?;
        check_url("videoUrl", &input.video_url)?;
        check_url("pdfUrl", &input.pdf_url)?;
        check_url("googleFormUrl", &input.google_form_url)?;

        let mut statement = Query::update()
            .table(Chapter::Table)
            .value(Chapter::UpdatedAt, pensum_shared::unix_now())
            .and_where(Expr::col(Chapter::Id).eq(&chapter.id))
            .to_owned();

        if let Some(title) = input.title {
            let title = title.trim().to_owned();
            if title.is_empty() {
                pensum_shared::bail!("title is required");
            }

            statement.value(Chapter::Title, title);
        }

        if let Some(description) = input.description {
            statement.value(Chapter::Description, normalize(description));
        }

        if let Some(video_url) = input.video_url {
            statement.value(Chapter::VideoUrl, normalize(video_url));
        }

        if let Some(pdf_url) = input.pdf_url {
            statement.value(Chapter::PdfUrl, normalize(pdf_url));
        }

        if let Some(google_form_url) = input.google_form_url {
            statement.value(Chapter::GoogleFormUrl, normalize(google_form_url));
        }

        if let Some(is_free) = input.is_free {
            statement.value(Chapter::IsFree, is_free);
        }

        if let Some(unlock_at) = input.unlock_at {
            statement.value(
                Chapter::UnlockAt,
                unlock_at.map(|unlock_at| unlock_at.unix_timestamp()),
            );
        }

        if let Some(topic_id) = input.topic_id {
            let topic_id = normalize(topic_id);
            if let Some(topic_id) = &topic_id {
                if repository::find_topic(&self.write_db, &course.id, topic_id)
                    .await?
                    .is_none()
                {
                    pensum_shared::not_found!("topic");
                }
            }

            statement.value(Chapter::TopicId, topic_id);
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        Ok(())
    }

    pub async fn delete_chapter(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        chapter_id: impl Into<String>,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        let chapter = self.owned_chapter(&course.id, chapter_id).await?;
        let mut tx = self.write_db.begin().await?;

        let statements = [
            Query::delete()
                .from_table(UserProgress::Table)
                .and_where(Expr::col(UserProgress::ChapterId).eq(&chapter.id))
                .to_owned(),
            Query::delete()
                .from_table(Chapter::Table)
                .and_where(Expr::col(Chapter::Id).eq(&chapter.id))
                .to_owned(),
        ];

        for statement in statements {
            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::info!(course_id = %course.id, chapter_id = %chapter.id, "chapter deleted");

        self.unpublish_course_if_empty(&course).await
    }

    /// Applies every new position in one transaction. An id outside the course
    /// aborts the whole reorder.
    pub async fn reorder_chapters(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        positions: Vec<PositionInput>,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        let mut tx = self.write_db.begin().await?;
        let now = pensum_shared::unix_now();

        for item in positions {
            let statement = Query::update()
                .table(Chapter::Table)
                .values([
                    (Chapter::Position, item.position.into()),
                    (Chapter::UpdatedAt, now.into()),
                ])
                .and_where(Expr::col(Chapter::Id).eq(item.id))
                .and_where(Expr::col(Chapter::CourseId).eq(&course.id))
                .to_owned();

            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            let result = sqlx::query_with(&sql, values).execute(&mut *tx).await?;

            if result.rows_affected() == 0 {
                pensum_shared::not_found!("chapter");
            }
        }

        tx.commit().await?;

        Ok(())
    }

    pub async fn publish_chapter(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        chapter_id: impl Into<String>,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        let chapter = self.owned_chapter(&course.id, chapter_id).await?;

        if !chapter.has_learning_material() {
            pensum_shared::bail!("a chapter needs a title and a video or pdf to be published");
        }

        set_chapter_published(&self.write_db, &chapter.id, true).await?;

        tracing::info!(course_id = %course.id, chapter_id = %chapter.id, "chapter published");

        Ok(())
    }

    pub async fn unpublish_chapter(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        chapter_id: impl Into<String>,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        let chapter = self.owned_chapter(&course.id, chapter_id).await?;

        set_chapter_published(&self.write_db, &chapter.id, false).await?;

        self.unpublish_course_if_empty(&course).await
    }

    async fn owned_chapter(
        &self,
        course_id: &str,
        chapter_id: impl Into<String>,
    ) -> pensum_shared::Result<ChapterRow> {
        let Some(chapter) = repository::find_chapter(&self.write_db, course_id, chapter_id).await?
        else {
            pensum_shared::not_found!("chapter");
        };

        Ok(chapter)
    }
}

async fn set_chapter_published(
    pool: &sqlx::SqlitePool,
    chapter_id: &str,
    is_published: bool,
) -> pensum_shared::Result<()> {
    let statement = Query::update()
        .table(Chapter::Table)
        .values([
            (Chapter::IsPublished, is_published.into()),
            (Chapter::UpdatedAt, pensum_shared::unix_now().into()),
        ])
        .and_where(Expr::col(Chapter::Id).eq(chapter_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}
