use sqlx_migrator::{Info, Migrator};

mod m0001;
pub mod table;

pub fn migrator() -> Result<Migrator<sqlx::Sqlite>, sqlx_migrator::Error> {
    let mut migrator = Migrator::default();
    migrator.add_migrations(vec![Box::new(m0001::Migration)])?;

    Ok(migrator)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
    use sqlx_migrator::{Migrate, Plan};
    use temp_dir::TempDir;

    async fn migrated_pool(dir: &TempDir) -> anyhow::Result<SqlitePool> {
        let path = dir.child("db.sqlite3");
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await?;
        let mut conn = pool.acquire().await?;
        super::migrator()?
            .run(&mut conn, &Plan::apply_all())
            .await?;

        Ok(pool)
    }

    #[tokio::test]
    async fn progress_pair_is_unique() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let pool = migrated_pool(&dir).await?;

        sqlx::query(
            r#"INSERT INTO "user_progress" ("user_id", "chapter_id", "is_completed", "updated_at") VALUES ('u1', 'c1', 1, 0)"#,
        )
        .execute(&pool)
        .await?;

        let duplicate = sqlx::query(
            r#"INSERT INTO "user_progress" ("user_id", "chapter_id", "is_completed", "updated_at") VALUES ('u1', 'c1', 0, 1)"#,
        )
        .execute(&pool)
        .await;

        assert!(duplicate.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn category_name_is_unique_ignoring_case() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let pool = migrated_pool(&dir).await?;

        sqlx::query(r#"INSERT INTO "category" ("id", "name", "created_at") VALUES ('c1', 'Music', 0)"#)
            .execute(&pool)
            .await?;

        let duplicate = sqlx::query(
            r#"INSERT INTO "category" ("id", "name", "created_at") VALUES ('c2', 'MUSIC', 0)"#,
        )
        .execute(&pool)
        .await;

        assert!(duplicate.is_err());

        Ok(())
    }
}
