use pensum_db::table::{Chapter, PensumTopic};
use pensum_shared::Identity;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Deserialize;
use validator::Validate;

use crate::repository::{self, PositionOf, TopicRow};

use super::PositionInput;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TopicInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}

impl super::Command {
    pub async fn create_topic(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        input: TopicInput,
    ) -> pensum_shared::Result<String> {
        let course = self.owned_course(identity, course_id).await?;
        let title = checked_title(input)?;

        let id = pensum_shared::new_id();
        let position =
            repository::next_position(&self.write_db, PositionOf::Topic, &course.id).await?;

        let statement = Query::insert()
            .into_table(PensumTopic::Table)
            .columns([
                PensumTopic::Id,
                PensumTopic::CourseId,
                PensumTopic::Title,
                PensumTopic::Position,
                PensumTopic::IsPublished,
                PensumTopic::CreatedAt,
            ])
            .values_panic([
                id.to_owned().into(),
                course.id.to_owned().into(),
                title.into(),
                position.into(),
                false.into(),
                pensum_shared::unix_now().into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        tracing::info!(course_id = %course.id, topic_id = %id, "topic created");

        Ok(id)
    }

    pub async fn update_topic(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        topic_id: impl Into<String>,
        input: TopicInput,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        let topic = self.owned_topic(&course.id, topic_id).await?;
        let title = checked_title(input)?;

        let statement = Query::update()
            .table(PensumTopic::Table)
            .value(PensumTopic::Title, title)
            .and_where(Expr::col(PensumTopic::Id).eq(&topic.id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        Ok(())
    }

    /// Deletes the topic. Its chapters stay in the course without a topic.
    pub async fn delete_topic(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        topic_id: impl Into<String>,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        let topic = self.owned_topic(&course.id, topic_id).await?;
        let mut tx = self.write_db.begin().await?;

        let detach = Query::update()
            .table(Chapter::Table)
            .value(Chapter::TopicId, Option::<String>::None)
            .and_where(Expr::col(Chapter::TopicId).eq(&topic.id))
            .to_owned();

        let (sql, values) = detach.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        let delete = Query::delete()
            .from_table(PensumTopic::Table)
            .and_where(Expr::col(PensumTopic::Id).eq(&topic.id))
            .to_owned();

        let (sql, values) = delete.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        tx.commit().await?;

        tracing::info!(course_id = %course.id, topic_id = %topic.id, "topic deleted");

        Ok(())
    }

    pub async fn reorder_topics(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        positions: Vec<PositionInput>,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        let mut tx = self.write_db.begin().await?;

        for item in positions {
            let statement = Query::update()
                .table(PensumTopic::Table)
                .value(PensumTopic::Position, item.position)
                .and_where(Expr::col(PensumTopic::Id).eq(item.id))
                .and_where(Expr::col(PensumTopic::CourseId).eq(&course.id))
                .to_owned();

            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            let result = sqlx::query_with(&sql, values).execute(&mut *tx).await?;

            if result.rows_affected() == 0 {
                pensum_shared::not_found!("topic");
            }
        }

        tx.commit().await?;

        Ok(())
    }

    pub async fn publish_topic(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        topic_id: impl Into<String>,
    ) -> pensum_shared::Result<()> {
        self.set_topic_published(identity, course_id, topic_id, true)
            .await
    }

    pub async fn unpublish_topic(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        topic_id: impl Into<String>,
    ) -> pensum_shared::Result<()> {
        self.set_topic_published(identity, course_id, topic_id, false)
            .await
    }

    async fn set_topic_published(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        topic_id: impl Into<String>,
        is_published: bool,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        let topic = self.owned_topic(&course.id, topic_id).await?;

        let statement = Query::update()
            .table(PensumTopic::Table)
            .value(PensumTopic::IsPublished, is_published)
            .and_where(Expr::col(PensumTopic::Id).eq(&topic.id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        tracing::info!(topic_id = %topic.id, is_published, "topic visibility changed");

        if !is_published {
            self.unpublish_course_if_empty(&course).await?;
        }

        Ok(())
    }

    async fn owned_topic(
        &self,
        course_id: &str,
        topic_id: impl Into<String>,
    ) -> pensum_shared::Result<TopicRow> {
        let Some(topic) = repository::find_topic(&self.write_db, course_id, topic_id).await? else {
            pensum_shared::not_found!("topic");
        };

        Ok(topic)
    }
}

fn checked_title(input: TopicInput) -> pensum_shared::Result<String> {
    input.validate()?;

    let title = input.title.trim().to_owned();
    if title.is_empty() {
        pensum_shared::bail!("title is required");
    }

    Ok(title)
}
