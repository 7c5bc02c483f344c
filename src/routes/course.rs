use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use pensum_course::{
    CatalogFilter, CourseDetail, CourseRow, CourseSummary, CreateCourseInput, UpdateCourseInput,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{auth::AuthUser, error::AppResult};

use super::{AppState, Created, Payload, Progress};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantPurchaseInput {
    pub user_id: String,
}

/// GET /courses - published catalog
pub async fn catalog(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(filter): Query<CatalogFilter>,
) -> AppResult<Json<Vec<CourseSummary>>> {
    Ok(Json(state.query.catalog(identity.id, filter).await?))
}

pub async fn detail(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(course_id): Path<String>,
) -> AppResult<Json<CourseDetail>> {
    let detail = state
        .query
        .course_detail(identity.id, course_id, OffsetDateTime::now_utc())
        .await?;

    Ok(Json(detail))
}

pub async fn progress(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(course_id): Path<String>,
) -> AppResult<Json<Progress>> {
    let progress = state
        .query
        .progress()
        .get_progress(identity.id, course_id)
        .await?;

    Ok(Json(Progress { progress }))
}

/// GET /teacher/courses - every course the caller authored, drafts included
pub async fn owned(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> AppResult<Json<Vec<CourseRow>>> {
    Ok(Json(state.command.list_owned_courses(&identity).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Payload(input): Payload<CreateCourseInput>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let id = state.command.create_course(&identity, input).await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(course_id): Path<String>,
    Payload(input): Payload<UpdateCourseInput>,
) -> AppResult<StatusCode> {
    state
        .command
        .update_course(&identity, course_id, input)
        .await?;

    Ok(StatusCode::OK)
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(course_id): Path<String>,
) -> AppResult<StatusCode> {
    state.command.delete_course(&identity, course_id).await?;

    Ok(StatusCode::OK)
}

pub async fn publish(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(course_id): Path<String>,
) -> AppResult<StatusCode> {
    state.command.publish_course(&identity, course_id).await?;

    Ok(StatusCode::OK)
}

pub async fn unpublish(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(course_id): Path<String>,
) -> AppResult<StatusCode> {
    state.command.unpublish_course(&identity, course_id).await?;

    Ok(StatusCode::OK)
}

pub async fn grant_purchase(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(course_id): Path<String>,
    Payload(input): Payload<GrantPurchaseInput>,
) -> AppResult<StatusCode> {
    state
        .command
        .grant_purchase(&identity, course_id, input.user_id)
        .await?;

    Ok(StatusCode::OK)
}
