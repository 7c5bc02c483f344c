use pensum_db::table::Purchase;
use pensum_shared::Identity;
use sea_query::{OnConflict, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;

impl super::Command {
    /// Records that `user_id` bought the course. Granting twice is a no-op.
    pub async fn grant_purchase(
        &self,
        identity: &Identity,
        course_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> pensum_shared::Result<()> {
        let course = self.owned_course(identity, course_id).await?;
        let user_id = user_id.into();

        if user_id.trim().is_empty() {
            pensum_shared::bail!("userId is required");
        }

        let statement = Query::insert()
            .into_table(Purchase::Table)
            .columns([Purchase::UserId, Purchase::CourseId, Purchase::CreatedAt])
            .values_panic([
                user_id.to_owned().into(),
                course.id.to_owned().into(),
                pensum_shared::unix_now().into(),
            ])
            .on_conflict(
                OnConflict::columns([Purchase::UserId, Purchase::CourseId])
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        tracing::info!(course_id = %course.id, user_id = %user_id, "purchase granted");

        Ok(())
    }
}
