use pensum_db::table::{Category, Chapter, Course, PensumTopic, Purchase};
use pensum_progress::visible_chapter;
use sea_query::{Expr, ExprTrait, Func, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::{SqlitePool, prelude::FromRow};
use time::OffsetDateTime;

use crate::access::ChapterAccess;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i64>,
    pub category_id: Option<String>,
    pub is_published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRow {
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
    pub is_published: bool,
    pub unlock_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ChapterRow {
    /// An unrepresentable timestamp is treated as no unlock date.
    pub fn unlock_at(&self) -> Option<OffsetDateTime> {
        self.unlock_at
            .and_then(|at| OffsetDateTime::from_unix_timestamp(at).ok())
    }

    /// A non-empty title and a video or a PDF.
    pub fn has_learning_material(&self) -> bool {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .is_some_and(|value| !value.trim().is_empty())
        };

        !self.title.trim().is_empty() && (present(&self.video_url) || present(&self.pdf_url))
    }

    pub fn access(&self, has_purchase: bool, course_price: Option<i64>) -> ChapterAccess {
        ChapterAccess {
            has_purchase,
            course_price,
            is_free: self.is_free,
            unlock_at: self.unlock_at(),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRow {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub position: i64,
    pub is_published: bool,
}

const COURSE_COLUMNS: [Course; 10] = [
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
];

const CHAPTER_COLUMNS: [Chapter; 14] = [
    Chapter::Id,
    Chapter::CourseId,
    Chapter::TopicId,
    Chapter::Title,
    Chapter::Description,
    Chapter::VideoUrl,
    Chapter::PdfUrl,
    Chapter::GoogleFormUrl,
    Chapter::Position,
    Chapter::IsFree,
    Chapter::IsPublished,
    Chapter::UnlockAt,
    Chapter::CreatedAt,
    Chapter::UpdatedAt,
];

const TOPIC_COLUMNS: [PensumTopic; 5] = [
    PensumTopic::Id,
    PensumTopic::CourseId,
    PensumTopic::Title,
    PensumTopic::Position,
    PensumTopic::IsPublished,
];

pub enum FindCourse {
    Published(String),
    OwnedBy { id: String, user_id: String },
}

pub(crate) async fn find_course(
    pool: &SqlitePool,
    find: FindCourse,
) -> pensum_shared::Result<Option<CourseRow>> {
    let mut statement = Query::select()
        .columns(COURSE_COLUMNS)
        .from(Course::Table)
        .limit(1)
        .to_owned();

    match find {
        FindCourse::Published(id) => statement
            .and_where(Expr::col(Course::Id).eq(id))
            .and_where(Expr::col(Course::IsPublished).eq(true)),
        FindCourse::OwnedBy { id, user_id } => statement
            .and_where(Expr::col(Course::Id).eq(id))
            .and_where(Expr::col(Course::UserId).eq(user_id)),
    };

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, CourseRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

/// Chapters a student can see, in reading order.
pub(crate) async fn list_visible_chapters(
    pool: &SqlitePool,
    course_id: impl Into<String>,
) -> pensum_shared::Result<Vec<ChapterRow>> {
    let statement = Query::select()
        .columns(CHAPTER_COLUMNS)
        .from(Chapter::Table)
        .and_where(Expr::col(Chapter::CourseId).eq(course_id.into()))
        .and_where(visible_chapter())
        .order_by(Chapter::Position, Order::Asc)
        .order_by(Chapter::CreatedAt, Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, ChapterRow, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub(crate) async fn find_chapter(
    pool: &SqlitePool,
    course_id: impl Into<String>,
    chapter_id: impl Into<String>,
) -> pensum_shared::Result<Option<ChapterRow>> {
    let statement = Query::select()
        .columns(CHAPTER_COLUMNS)
        .from(Chapter::Table)
        .and_where(Expr::col(Chapter::Id).eq(chapter_id.into()))
        .and_where(Expr::col(Chapter::CourseId).eq(course_id.into()))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, ChapterRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) async fn list_topics(
    pool: &SqlitePool,
    course_id: impl Into<String>,
) -> pensum_shared::Result<Vec<TopicRow>> {
    let statement = Query::select()
        .columns(TOPIC_COLUMNS)
        .from(PensumTopic::Table)
        .and_where(Expr::col(PensumTopic::CourseId).eq(course_id.into()))
        .order_by(PensumTopic::Position, Order::Asc)
        .order_by(PensumTopic::CreatedAt, Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, TopicRow, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub(crate) async fn find_topic(
    pool: &SqlitePool,
    course_id: impl Into<String>,
    topic_id: impl Into<String>,
) -> pensum_shared::Result<Option<TopicRow>> {
    let statement = Query::select()
        .columns(TOPIC_COLUMNS)
        .from(PensumTopic::Table)
        .and_where(Expr::col(PensumTopic::Id).eq(topic_id.into()))
        .and_where(Expr::col(PensumTopic::CourseId).eq(course_id.into()))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, TopicRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) async fn has_purchase(
    pool: &SqlitePool,
    user_id: impl Into<String>,
    course_id: impl Into<String>,
) -> pensum_shared::Result<bool> {
    let statement = Query::select()
        .column(Purchase::CourseId)
        .from(Purchase::Table)
        .and_where(Expr::col(Purchase::UserId).eq(user_id.into()))
        .and_where(Expr::col(Purchase::CourseId).eq(course_id.into()))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_as_with::<_, (String,), _>(&sql, values)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

pub(crate) async fn category_exists(
    pool: &SqlitePool,
    id: impl Into<String>,
) -> pensum_shared::Result<bool> {
    let statement = Query::select()
        .column(Category::Id)
        .from(Category::Table)
        .and_where(Expr::col(Category::Id).eq(id.into()))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_as_with::<_, (String,), _>(&sql, values)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

pub enum PositionOf {
    Chapter,
    Topic,
}

/// Position right after the last chapter (or topic) of the course.
pub(crate) async fn next_position(
    pool: &SqlitePool,
    of: PositionOf,
    course_id: impl Into<String>,
) -> pensum_shared::Result<i64> {
    let course_id = course_id.into();
    let statement = match of {
        PositionOf::Chapter => Query::select()
            .expr(Func::max(Expr::col(Chapter::Position)))
            .from(Chapter::Table)
            .and_where(Expr::col(Chapter::CourseId).eq(course_id))
            .to_owned(),
        PositionOf::Topic => Query::select()
            .expr(Func::max(Expr::col(PensumTopic::Position)))
            .from(PensumTopic::Table)
            .and_where(Expr::col(PensumTopic::CourseId).eq(course_id))
            .to_owned(),
    };

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let (max,) = sqlx::query_as_with::<_, (Option<i64>,), _>(&sql, values)
        .fetch_one(pool)
        .await?;

    Ok(max.map(|max| max + 1).unwrap_or(0))
}

/// Visible chapters of the course carrying learning material.
pub(crate) async fn count_publishable_chapters(
    pool: &SqlitePool,
    course_id: impl Into<String>,
) -> pensum_shared::Result<usize> {
    let chapters = list_visible_chapters(pool, course_id).await?;

    Ok(chapters
        .iter()
        .filter(|chapter| chapter.has_learning_material())
        .count())
}
