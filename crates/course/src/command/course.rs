use pensum_db::table::{Chapter, Course, PensumTopic, Purchase, UserProgress};
use pensum_shared::Identity;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Deserialize;
use validator::Validate;

use crate::repository::{self, CourseRow};

use super::{check_url, normalize, patch, set_course_published};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "patch")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch")]
    pub price: Option<Option<i64>>,
    #[serde(default, deserialize_with = "patch")]
    pub category_id: Option<Option<String>>,
}

impl super::Command {
    pub async fn create_course(
        &self,
        identity: &Identity,
        input: CreateCourseInput,
    ) -> pensum_shared::Result<String> {
        self.policy.assert_teacher(identity)?;
        input.validate()?;

        let title = input.title.trim().to_owned();
        if title.is_empty() {
            pensum_shared::bail!("title is required");
        }

        let id = pensum_shared::new_id();
        let now = pensum_shared::unix_now();

        let statement = Query::insert()
            .into_table(Course::Table)
            .columns([
                Course::Id,
                Course::UserId,
                Course::Title,
                Course::IsPublished,
                Course::CreatedAt,
                Course::UpdatedAt,
            ])
            .values_panic([
                id.to_owned().into(),
                identity.id.to_owned().into(),
                title.into(),
                false.into(),
                now.into(),
                now.into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        tracing::info!(course_id = %id, user_id = %identity.id, "course created");

        Ok(id)
    }

    pub async fn update_course(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        input: UpdateCourseInput,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        input.validate()?;
        check_url("imageUrl", &input.image_url)?;

        let mut statement = Query::update()
            .table(Course::Table)
            .value(Course::UpdatedAt, pensum_shared::unix_now())
            .and_where(Expr::col(Course::Id).eq(&course.id))
            .to_owned();

        if let Some(title) = input.title {
            let title = title.trim().to_owned();
            if title.is_empty() {
                pensum_shared::bail!("title is required");
            }

            statement.value(Course::Title, title);
        }

        if let Some(description) = input.description {
            statement.value(Course::Description, normalize(description));
        }

        if let Some(image_url) = input.image_url {
            statement.value(Course::ImageUrl, normalize(image_url));
        }

        if let Some(price) = input.price {
            if price.is_some_and(|price| price < 0) {
                pensum_shared::bail!("price must be zero or more");
            }

            statement.value(Course::Price, price);
        }

        if let Some(category_id) = input.category_id {
            let category_id = normalize(category_id);
            if let Some(category_id) = &category_id {
                if !repository::category_exists(&self.write_db, category_id).await? {
                    pensum_shared::not_found!("category");
                }
            }

            statement.value(Course::CategoryId, category_id);
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        Ok(())
    }

    /// Removes the course with its chapters, topics, progress rows and purchases.
    pub async fn delete_course(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        let mut tx = self.write_db.begin().await?;

        let chapter_ids = Query::select()
            .column(Chapter::Id)
            .from(Chapter::Table)
            .and_where(Expr::col(Chapter::CourseId).eq(&course.id))
            .to_owned();

        let statements = [
            Query::delete()
                .from_table(UserProgress::Table)
                .and_where(Expr::col(UserProgress::ChapterId).in_subquery(chapter_ids))
                .to_owned(),
            Query::delete()
                .from_table(Chapter::Table)
                .and_where(Expr::col(Chapter::CourseId).eq(&course.id))
                .to_owned(),
            Query::delete()
                .from_table(PensumTopic::Table)
                .and_where(Expr::col(PensumTopic::CourseId).eq(&course.id))
                .to_owned(),
            Query::delete()
                .from_table(Purchase::Table)
                .and_where(Expr::col(Purchase::CourseId).eq(&course.id))
                .to_owned(),
            Query::delete()
                .from_table(Course::Table)
                .and_where(Expr::col(Course::Id).eq(&course.id))
                .to_owned(),
        ];

        for statement in statements {
            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::info!(course_id = %course.id, "course deleted");

        Ok(())
    }

    pub async fn publish_course(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;

        if repository::count_publishable_chapters(&self.write_db, &course.id).await? == 0 {
            pensum_shared::bail!(
                "a course needs at least one published chapter with a title and a video or pdf"
            );
        }

        set_course_published(&self.write_db, &course.id, true).await?;

        tracing::info!(course_id = %course.id, "course published");

        Ok(())
    }

    pub async fn unpublish_course(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;

        set_course_published(&self.write_db, &course.id, false).await?;

        Ok(())
    }

    /// Every course the teacher owns, drafts included, newest first.
    pub async fn list_owned_courses(
        &self,
        identity: &Identity,
    ) -> pensum_shared::Result<Vec<CourseRow>> {
        self.policy.assert_teacher(identity)?;

        let statement = Query::select()
            .columns([
                Course::Id,
                Course::UserId,
                Course::Title,
                Course::Description,
                Course::ImageUrl,
                Course::Price,
                Course::CategoryId,
                Course::IsPublished,
                Course::CreatedAt,
                Course::UpdatedAt,
            ])
            .from(Course::Table)
            .and_where(Expr::col(Course::UserId).eq(&identity.id))
            .order_by(Course::CreatedAt, sea_query::Order::Desc)
            .order_by(Course::Id, sea_query::Order::Desc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, CourseRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?)
    }
}
