use axum::{Json, extract::State, http::StatusCode};
use pensum_course::{CategoryRow, CreateCategoryInput};

use crate::{auth::AuthUser, error::AppResult};

use super::{AppState, Created, Payload};

pub async fn list(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> AppResult<Json<Vec<CategoryRow>>> {
    Ok(Json(state.query.list_categories().await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Payload(input): Payload<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let id = state.command.create_category(&identity, input).await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}
