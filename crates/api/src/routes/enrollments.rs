//! Route definitions for enrollments and enrollment tracking.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::enrollments;
use crate::state::AppState;

/// Enrollment routes mounted at `/enrollments`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /analytics         -> analytics
/// GET    /{id}              -> get_by_id
/// DELETE /{id}              -> delete
/// PUT    /{id}/status       -> update_status
/// PUT    /{id}/progress     -> record_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(enrollments::list).post(enrollments::create))
        .route("/analytics", get(enrollments::analytics))
        .route(
            "/{id}",
            get(enrollments::get_by_id).delete(enrollments::delete),
        )
        .route("/{id}/status", put(enrollments::update_status))
        .route("/{id}/progress", put(enrollments::record_progress))
}
