use std::{collections::HashSet, ops::Deref};

use pensum_db::table::{Chapter, PensumTopic, UserProgress};
use pensum_shared::State;
use sea_query::{Expr, ExprTrait, Func, OnConflict, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;

/// Per-user, per-chapter completion rows and the course percentage derived from them.
#[derive(Clone)]
pub struct ProgressStore(pub State);

impl Deref for ProgressStore {
    type Target = State;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Chapters a student can see: published, and either loose or under a
/// published topic.
pub fn visible_chapter() -> Expr {
    let published_topics = Query::select()
        .column((PensumTopic::Table, PensumTopic::Id))
        .from(PensumTopic::Table)
        .and_where(Expr::col((PensumTopic::Table, PensumTopic::IsPublished)).eq(true))
        .to_owned();

    Expr::col((Chapter::Table, Chapter::IsPublished))
        .eq(true)
        .and(
            Expr::col((Chapter::Table, Chapter::TopicId))
                .is_null()
                .or(Expr::col((Chapter::Table, Chapter::TopicId)).in_subquery(published_topics)),
        )
}

/// `round(100 * completed / total)`, 0 when there is nothing to complete.
pub fn percent(completed: i64, total: i64) -> u8 {
    if total <= 0 {
        return 0;
    }

    let completed = completed.clamp(0, total);

    ((200 * completed + total) / (2 * total)) as u8
}

impl ProgressStore {
    /// Upserts the single (user, chapter) row. Last write wins.
    pub async fn set_chapter_completion(
        &self,
        user_id: impl Into<String>,
        chapter_id: impl Into<String>,
        is_completed: bool,
    ) -> pensum_shared::Result<()> {
        let user_id = user_id.into();
        let chapter_id = chapter_id.into();

        let statement = Query::insert()
            .into_table(UserProgress::Table)
            .columns([
                UserProgress::UserId,
                UserProgress::ChapterId,
                UserProgress::IsCompleted,
                UserProgress::UpdatedAt,
            ])
            .values_panic([
                user_id.to_owned().into(),
                chapter_id.to_owned().into(),
                is_completed.into(),
                pensum_shared::unix_now().into(),
            ])
            .on_conflict(
                OnConflict::columns([UserProgress::UserId, UserProgress::ChapterId])
                    .update_columns([UserProgress::IsCompleted, UserProgress::UpdatedAt])
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        tracing::debug!(
            user_id = %user_id,
            chapter_id = %chapter_id,
            is_completed,
            "chapter completion stored"
        );

        Ok(())
    }

    pub async fn completed_chapter_ids(
        &self,
        user_id: impl Into<String>,
        course_id: impl Into<String>,
    ) -> pensum_shared::Result<HashSet<String>> {
        let statement = Query::select()
            .column((UserProgress::Table, UserProgress::ChapterId))
            .from(UserProgress::Table)
            .inner_join(
                Chapter::Table,
                Expr::col((Chapter::Table, Chapter::Id))
                    .equals((UserProgress::Table, UserProgress::ChapterId)),
            )
            .and_where(Expr::col((UserProgress::Table, UserProgress::UserId)).eq(user_id.into()))
            .and_where(Expr::col((Chapter::Table, Chapter::CourseId)).eq(course_id.into()))
            .and_where(Expr::col((UserProgress::Table, UserProgress::IsCompleted)).eq(true))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, (String,), _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Percentage of the course's visible chapters the user completed.
    pub async fn get_progress(
        &self,
        user_id: impl Into<String>,
        course_id: impl Into<String>,
    ) -> pensum_shared::Result<u8> {
        let course_id = course_id.into();

        let total_statement = Query::select()
            .expr(Func::count(Expr::col(Chapter::Id)))
            .from(Chapter::Table)
            .and_where(Expr::col(Chapter::CourseId).eq(&course_id))
            .and_where(visible_chapter())
            .to_owned();

        let (sql, values) = total_statement.build_sqlx(SqliteQueryBuilder);
        let (total,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_one(&self.read_db)
            .await?;

        if total == 0 {
            return Ok(0);
        }

        let completed_statement = Query::select()
            .expr(Func::count(Expr::col((
                UserProgress::Table,
                UserProgress::ChapterId,
            ))))
            .from(UserProgress::Table)
            .inner_join(
                Chapter::Table,
                Expr::col((Chapter::Table, Chapter::Id))
                    .equals((UserProgress::Table, UserProgress::ChapterId)),
            )
            .and_where(Expr::col((UserProgress::Table, UserProgress::UserId)).eq(user_id.into()))
            .and_where(Expr::col((Chapter::Table, Chapter::CourseId)).eq(&course_id))
            .and_where(visible_chapter())
            .and_where(Expr::col((UserProgress::Table, UserProgress::IsCompleted)).eq(true))
            .to_owned();

        let (sql, values) = completed_statement.build_sqlx(SqliteQueryBuilder);
        let (completed,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_one(&self.read_db)
            .await?;

        Ok(percent(completed, total))
    }
}
