use axum::{
    Json, Router,
    extract::{FromRequest, Request},
    routing::{get, patch, post, put},
};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::SqlitePool;

use crate::error::AppError;

mod category;
mod chapter;
mod course;
mod health;
mod topic;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub command: pensum_course::Command,
    pub query: pensum_course::Query,
    pub pool: SqlitePool,
}

/// JSON extractor whose rejections answer with the service's error body.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        Ok(Payload(value))
    }
}

#[derive(Serialize)]
pub struct Created {
    pub id: String,
}

#[derive(Serialize)]
pub struct Progress {
    pub progress: u8,
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(app_state.pool.clone())
        .merge(
            Router::new()
                .route("/categories", get(category::list).post(category::create))
                .route("/courses", get(course::catalog).post(course::create))
                .route(
                    "/courses/{course_id}",
                    get(course::detail)
                        .patch(course::update)
                        .delete(course::delete),
                )
                .route("/courses/{course_id}/publish", patch(course::publish))
                .route("/courses/{course_id}/unpublish", patch(course::unpublish))
                .route("/courses/{course_id}/purchases", post(course::grant_purchase))
                .route("/courses/{course_id}/progress", get(course::progress))
                .route("/courses/{course_id}/chapters", post(chapter::create))
                .route("/courses/{course_id}/chapters/reorder", put(chapter::reorder))
                .route(
                    "/courses/{course_id}/chapters/{chapter_id}",
                    get(chapter::view)
                        .patch(chapter::update)
                        .delete(chapter::delete),
                )
                .route(
                    "/courses/{course_id}/chapters/{chapter_id}/publish",
                    patch(chapter::publish),
                )
                .route(
                    "/courses/{course_id}/chapters/{chapter_id}/unpublish",
                    patch(chapter::unpublish),
                )
                .route(
                    "/courses/{course_id}/chapters/{chapter_id}/progress",
                    put(chapter::set_progress),
                )
                .route("/courses/{course_id}/topics", post(topic::create))
                .route("/courses/{course_id}/topics/reorder", put(topic::reorder))
                .route(
                    "/courses/{course_id}/topics/{topic_id}",
                    patch(topic::update).delete(topic::delete),
                )
                .route(
                    "/courses/{course_id}/topics/{topic_id}/publish",
                    patch(topic::publish),
                )
                .route(
                    "/courses/{course_id}/topics/{topic_id}/unpublish",
                    patch(topic::unpublish),
                )
                .route("/teacher/courses", get(course::owned))
                .with_state(app_state),
        )
}
