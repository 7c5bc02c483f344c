use std::collections::HashSet;

use pensum_db::table::{Category, Chapter, Course, Purchase};
use sea_query::{Alias, Expr, ExprTrait, Func, LikeExpr, Order, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use pensum_progress::visible_chapter;

use crate::access::has_course_access;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    pub title: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Debug, FromRow)]
struct CatalogRow {
    id: String,
    title: String,
    description: Option<String>,
    image_url: Option<String>,
    price: Option<i64>,
    category_id: Option<String>,
    category_name: Option<String>,
    chapter_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i64>,
    pub category_id: Option<String>,
    pub category: Option<String>,
    pub chapter_count: i64,
    pub has_access: bool,
    /// Only reported for courses the user can access.
    pub progress: Option<u8>,
}

impl super::Query {
    /// Published courses, newest first.
    pub async fn catalog(
        &self,
        user_id: impl Into<String>,
        filter: CatalogFilter,
    ) -> pensum_shared::Result<Vec<CourseSummary>> {
        let user_id = user_id.into();

        let mut statement = sea_query::Query::select()
            .columns([
                (Course::Table, Course::Id),
                (Course::Table, Course::Title),
                (Course::Table, Course::Description),
                (Course::Table, Course::ImageUrl),
                (Course::Table, Course::Price),
                (Course::Table, Course::CategoryId),
            ])
            .expr_as(
                Expr::col((Category::Table, Category::Name)),
                Alias::new("category_name"),
            )
            .expr_as(
                Func::count(Expr::col((Chapter::Table, Chapter::Id))),
                Alias::new("chapter_count"),
            )
            .from(Course::Table)
            .left_join(
                Category::Table,
                Expr::col((Category::Table, Category::Id))
                    .equals((Course::Table, Course::CategoryId)),
            )
            .left_join(
                Chapter::Table,
                Expr::col((Chapter::Table, Chapter::CourseId))
                    .equals((Course::Table, Course::Id))
                    .and(visible_chapter()),
            )
            .and_where(Expr::col((Course::Table, Course::IsPublished)).eq(true))
            .group_by_col((Course::Table, Course::Id))
            .order_by((Course::Table, Course::CreatedAt), Order::Desc)
            .order_by((Course::Table, Course::Id), Order::Desc)
            .to_owned();

        if let Some(title) = filter.title.as_deref().map(str::trim) {
            if !title.is_empty() {
                statement.and_where(
                    Expr::col((Course::Table, Course::Title))
                        .like(LikeExpr::new(format!("%{}%", escape_like(title))).escape('\\')),
                );
            }
        }

        if let Some(category_id) = filter.category_id {
            statement.and_where(Expr::col((Course::Table, Course::CategoryId)).eq(category_id));
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, CatalogRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        let purchased = self.purchased_course_ids(&user_id).await?;
        let mut summaries = Vec::with_capacity(rows.len());

        for row in rows {
            let has_access = has_course_access(purchased.contains(&row.id), row.price);
            let progress = if has_access {
                Some(self.progress.get_progress(&user_id, &row.id).await?)
            } else {
                None
            };

            summaries.push(CourseSummary {
                id: row.id,
                title: row.title,
                description: row.description,
                image_url: row.image_url,
                price: row.price,
                category_id: row.category_id,
                category: row.category_name,
                chapter_count: row.chapter_count,
                has_access,
                progress,
            });
        }

        Ok(summaries)
    }

    async fn purchased_course_ids(&self, user_id: &str) -> pensum_shared::Result<HashSet<String>> {
        let statement = sea_query::Query::select()
            .column(Purchase::CourseId)
            .from(Purchase::Table)
            .and_where(Expr::col(Purchase::UserId).eq(user_id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, (String,), _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

/// Makes `%` and `_` match themselves in a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
