//! Route definitions for curriculum modules.

use axum::routing::get;
use axum::Router;

use crate::handlers::modules;
use crate::state::AppState;

/// Module routes mounted at `/modules`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// DELETE /{id}             -> delete
/// GET    /{id}/stats       -> stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(modules::list).post(modules::create))
        .route(
            "/{id}",
            get(modules::get_by_id)
                .put(modules::update)
                .delete(modules::delete),
        )
        .route("/{id}/stats", get(modules::stats))
}
