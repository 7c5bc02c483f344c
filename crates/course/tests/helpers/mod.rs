use std::{path::PathBuf, str::FromStr};

use pensum_course::{
    Command, CreateChapterInput, CreateCourseInput, Query, UpdateChapterInput, UpdateCourseInput,
};
use pensum_shared::{Identity, State, TeacherPolicy};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};

pub const TEACHER: &str = "teacher@pensum.localhost";
pub const OTHER_TEACHER: &str = "other.teacher@pensum.localhost";

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
pub fn setup(state: &State) -> (Command, Query) {
    let policy = TeacherPolicy::new([TEACHER, OTHER_TEACHER]);

    (
        Command::new(state.clone(), policy),
        Query::new(state.clone()),
    )
}

#[allow(dead_code)]
pub fn teacher() -> Identity {
    Identity::new("user_teacher", TEACHER)
}

#[allow(dead_code)]
pub fn other_teacher() -> Identity {
    Identity::new("user_other_teacher", OTHER_TEACHER)
}

#[allow(dead_code)]
pub fn student(id: &str) -> Identity {
    Identity::new(id, format!("{id}@pensum.localhost"))
}

#[allow(dead_code)]
pub async fn create_course(cmd: &Command, title: &str, price: Option<i64>) -> anyhow::Result<String> {
    let id = cmd
        .create_course(
            &teacher(),
            CreateCourseInput {
                title: title.to_owned(),
            },
        )
        .await?;

    cmd.update_course(
        &teacher(),
        &id,
        UpdateCourseInput {
            price: Some(price),
            ..Default::default()
        },
    )
    .await?;

    Ok(id)
}

/// Chapter with a video, published unless told otherwise.
#[allow(dead_code)]
pub async fn create_chapter(
    cmd: &Command,
    course_id: &str,
    title: &str,
    topic_id: Option<&str>,
    publish: bool,
) -> anyhow::Result<String> {
    let id = cmd
        .create_chapter(
            &teacher(),
            course_id,
            CreateChapterInput {
                title: title.to_owned(),
                topic_id: topic_id.map(ToOwned::to_owned),
            },
        )
        .await?;

    cmd.update_chapter(
        &teacher(),
        course_id,
        &id,
        UpdateChapterInput {
            video_url: Some(Some(format!("https://videos.pensum.localhost/{id}.mp4"))),
            ..Default::default()
        },
    )
    .await?;

    if publish {
        cmd.publish_chapter(&teacher(), course_id, &id).await?;
    }

    Ok(id)
}

/// Published course holding `chapters` published chapters.
#[allow(dead_code)]
pub async fn create_published_course(
    cmd: &Command,
    title: &str,
    price: Option<i64>,
    chapters: usize,
) -> anyhow::Result<(String, Vec<String>)> {
    let course_id = create_course(cmd, title, price).await?;
    let mut ids = vec![];

    for n in 0..chapters {
        ids.push(create_chapter(cmd, &course_id, &format!("Chapter {n}"), None, true).await?);
    }

    cmd.publish_course(&teacher(), &course_id).await?;

    Ok((course_id, ids))
}

#[allow(dead_code)]
pub async fn set_created_at(state: &State, course_id: &str, created_at: i64) -> anyhow::Result<()> {
    sqlx::query(r#"UPDATE "course" SET "created_at" = ? WHERE "id" = ?"#)
        .bind(created_at)
        .bind(course_id)
        .execute(&state.write_db)
        .await?;

    Ok(())
}
