//! Route definitions for module content.

use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Router};

use crate::handlers::content;
use crate::middleware::rate_limit::{limit_by_client, RateLimiter};
use crate::state::AppState;

/// Content routes mounted at `/content`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// GET    /{id}                          -> get_by_id
/// PUT    /{id}                          -> update
/// DELETE /{id}                          -> delete
/// GET    /module/{moduleId}             -> by_module (rate limited)
/// GET    /module/{moduleId}/sections    -> sections
/// ```
pub fn router(rate_limiter: Arc<RateLimiter>) -> Router<AppState> {
    let learner = Router::new()
        .route("/module/{moduleId}", get(content::by_module))
        .route_layer(middleware::from_fn_with_state(rate_limiter, limit_by_client));

    Router::new()
        .route("/", get(content::list).post(content::create))
        .route(
            "/{id}",
            get(content::get_by_id)
                .put(content::update)
                .delete(content::delete),
        )
        .route("/module/{moduleId}/sections", get(content::sections))
        .merge(learner)
}
