use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use pensum_course::{ChapterView, CreateChapterInput, PositionInput, UpdateChapterInput};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{auth::AuthUser, error::AppResult};

use super::{AppState, Created, Payload, Progress};

#[derive(Debug, Deserialize)]
pub struct ReorderInput {
    pub list: Vec<PositionInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInput {
    pub is_completed: bool,
}

pub async fn view(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((course_id, chapter_id)): Path<(String, String)>,
) -> AppResult<Json<ChapterView>> {
    let view = state
        .query
        .chapter_view(identity.id, course_id, chapter_id, OffsetDateTime::now_utc())
        .await?;

    Ok(Json(view))
}

/// PUT /courses/{course_id}/chapters/{chapter_id}/progress
///
/// Answers with the recomputed course percentage.
pub async fn set_progress(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((course_id, chapter_id)): Path<(String, String)>,
    Payload(input): Payload<ProgressInput>,
) -> AppResult<Json<Progress>> {
    let progress = state
        .query
        .set_chapter_completion(
            identity.id,
            course_id,
            chapter_id,
            input.is_completed,
            OffsetDateTime::now_utc(),
        )
        .await?;

    Ok(Json(Progress { progress }))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(course_id): Path<String>,
    Payload(input): Payload<CreateChapterInput>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let id = state
        .command
        .create_chapter(&identity, course_id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((course_id, chapter_id)): Path<(String, String)>,
    Payload(input): Payload<UpdateChapterInput>,
) -> AppResult<StatusCode> {
    state
        .command
        .update_chapter(&identity, course_id, chapter_id, input)
        .await?;

    Ok(StatusCode::OK)
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((course_id, chapter_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .command
        .delete_chapter(&identity, course_id, chapter_id)
        .await?;

    Ok(StatusCode::OK)
}

pub async fn reorder(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(course_id): Path<String>,
    Payload(input): Payload<ReorderInput>,
) -> AppResult<StatusCode> {
    state
        .command
        .reorder_chapters(&identity, course_id, input.list)
        .await?;

    Ok(StatusCode::OK)
}

pub async fn publish(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((course_id, chapter_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .command
        .publish_chapter(&identity, course_id, chapter_id)
        .await?;

    Ok(StatusCode::OK)
}

pub async fn unpublish(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((course_id, chapter_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .command
        .unpublish_chapter(&identity, course_id, chapter_id)
        .await?;

    Ok(StatusCode::OK)
}
