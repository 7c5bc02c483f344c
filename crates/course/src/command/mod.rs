use std::ops::Deref;

use pensum_db::table::Course;
use pensum_shared::{Identity, State, TeacherPolicy};
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::{Deserialize, Deserializer};
use time::OffsetDateTime;
use validator::ValidateUrl;

use crate::repository::{self, CourseRow, FindCourse};

mod category;
mod chapter;
mod course;
mod purchase;
mod topic;

pub use category::*;
pub use chapter::*;
pub use course::*;
pub use topic::*;

/// Teacher-only authoring over courses, chapters, topics, categories and
/// purchase grants. Every operation resolves the caller's role first.
#[derive(Clone)]
pub struct Command {
    state: State,
    policy: TeacherPolicy,
}

impl Deref for Command {
    type Target = State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Command {
    pub fn new(state: State, policy: TeacherPolicy) -> Self {
        Self { state, policy }
    }

    pub fn policy(&self) -> &TeacherPolicy {
        &self.policy
    }

    /// Course owned by the caller. Someone else's course is reported as missing.
    pub(crate) async fn owned_course(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
    ) -> pensum_shared::Result<CourseRow> {
        self.policy.assert_teacher(identity)?;

        let Some(course) = repository::find_course(
            &self.write_db,
            FindCourse::OwnedBy {
                id: course_id.into(),
                user_id: identity.id.to_owned(),
            },
        )
        .await?
        else {
            pensum_shared::not_found!("course");
        };

        Ok(course)
    }

    /// Unpublishes a published course left without any chapter a student can see.
    pub(crate) async fn unpublish_course_if_empty(
        &self,
        course: &CourseRow,
    ) -> pensum_shared::Result<()> {
        if !course.is_published {
            return Ok(());
        }

        let remaining = repository::list_visible_chapters(&self.write_db, &course.id).await?;
        if !remaining.is_empty() {
            return Ok(());
        }

        set_course_published(&self.write_db, &course.id, false).await?;

        tracing::info!(
            course_id = %course.id,
            "course unpublished after its last visible chapter was removed"
        );

        Ok(())
    }
}

pub(crate) async fn set_course_published(
    pool: &sqlx::SqlitePool,
    course_id: &str,
    is_published: bool,
) -> pensum_shared::Result<()> {
    let statement = Query::update()
        .table(Course::Table)
        .values([
            (Course::IsPublished, is_published.into()),
            (Course::UpdatedAt, pensum_shared::unix_now().into()),
        ])
        .and_where(Expr::col(Course::Id).eq(course_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`).
pub(crate) fn patch<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Same as [`patch`] for RFC 3339 timestamps.
pub(crate) fn patch_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<Option<OffsetDateTime>>, D::Error>
where
    D: Deserializer<'de>,
{
    time::serde::rfc3339::option::deserialize(deserializer).map(Some)
}

/// Blank strings clear the field.
pub(crate) fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

pub(crate) fn check_url(field: &str, value: &Option<Option<String>>) -> pensum_shared::Result<()> {
    let Some(Some(url)) = value else {
        return Ok(());
    };

    let url = url.trim();
    if !url.is_empty() && !url.validate_url() {
        pensum_shared::bail!("{field} must be a valid url");
    }

    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInput {
    pub id: String,
    pub position: i64,
}
