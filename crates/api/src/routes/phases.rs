//! Route definitions for curriculum phases.

use axum::routing::get;
use axum::Router;

use crate::handlers::phases;
use crate::state::AppState;

/// Phase routes mounted at `/phases`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete
/// GET    /{id}/modules     -> list_modules
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(phases::list).post(phases::create))
        .route(
            "/{id}",
            get(phases::get_by_id)
                .put(phases::update)
                .delete(phases::delete),
        )
        .route("/{id}/modules", get(phases::list_modules))
}
