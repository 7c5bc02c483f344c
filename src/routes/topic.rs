use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use pensum_course::TopicInput;

use crate::{auth::AuthUser, error::AppResult};

use super::{AppState, Created, Payload, chapter::ReorderInput};

pub async fn create(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(course_id): Path<String>,
    Payload(input): Payload<TopicInput>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let id = state.command.create_topic(&identity, course_id, input).await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((course_id, topic_id)): Path<(String, String)>,
    Payload(input): Payload<TopicInput>,
) -> AppResult<StatusCode> {
    state
        .command
        .update_topic(&identity, course_id, topic_id, input)
        .await?;

    Ok(StatusCode::OK)
}

/// Chapters of the topic stay in the course, detached.
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((course_id, topic_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .command
        .delete_topic(&identity, course_id, topic_id)
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
        .reorder_topics(&identity, course_id, input.list)
        .await?;

    Ok(StatusCode::OK)
}

pub async fn publish(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((course_id, topic_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .command
        .publish_topic(&identity, course_id, topic_id)
        .await?;

    Ok(StatusCode::OK)
}

pub async fn unpublish(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path((course_id, topic_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    state
        .command
        .unpublish_topic(&identity, course_id, topic_id)
        .await?;

    Ok(StatusCode::OK)
}
