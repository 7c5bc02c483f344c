use std::{path::PathBuf, str::FromStr};

use pensum_shared::State;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<State> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let mut conn = pool.acquire().await?;
    pensum_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;

    Ok(State::single(pool))
}

#[allow(dead_code)]
pub async fn create_chapter(
    state: &State,
    course_id: &str,
    position: i64,
    is_published: bool,
) -> anyhow::Result<String> {
    let id = pensum_shared::new_id();

    sqlx::query(
        r#"INSERT INTO "chapter" ("id", "course_id", "title", "position", "is_published", "created_at", "updated_at")
        VALUES (?, ?, ?, ?, ?, 0, 0)"#,
    )
    .bind(&id)
    .bind(course_id)
    .bind(format!("Chapter {position}"))
    .bind(position)
    .bind(is_published)
    .execute(&state.write_db)
    .await?;

    Ok(id)
}

#[allow(dead_code)]
pub async fn count_rows(state: &State, user_id: &str, chapter_id: &str) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(
        r#"SELECT COUNT(*) FROM "user_progress" WHERE "user_id" = ? AND "chapter_id" = ?"#,
    )
    .bind(user_id)
    .bind(chapter_id)
    .fetch_one(&state.read_db)
    .await?;

    Ok(count)
}
