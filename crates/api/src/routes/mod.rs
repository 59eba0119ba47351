pub mod content;
pub mod dashboard;
pub mod enrollments;
pub mod health;
pub mod modules;
pub mod phases;
pub mod users;

use std::sync::Arc;

use axum::Router;

use crate::middleware::rate_limit::RateLimiter;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /phases                                  list, create
/// /phases/{id}                             get, update, delete
/// /phases/{id}/modules                     modules in phase
///
/// /modules                                 list (?phaseId, ?includeInactive), create
/// /modules/{id}                            get, update, delete
/// /modules/{id}/stats                      content and enrollment figures
///
/// /content                                 list (?moduleId, ?type, ?search), create
/// /content/{id}                            get, update, delete
/// /content/module/{moduleId}               learner read (rate limited)
/// /content/module/{moduleId}/sections      content grouped by section
///
/// /users                                   list, create
/// /users/{id}                              get
/// /users/{id}/enrollments                  enrollments of a user
///
/// /enrollments                             list (?moduleId, ?userId, ?status), enroll
/// /enrollments/analytics                   tracking analytics
/// /enrollments/{id}                        get, delete
/// /enrollments/{id}/status                 change status (PUT)
/// /enrollments/{id}/progress               record progress (PUT)
///
/// /dashboard/stats                         admin dashboard summary
/// ```
pub fn api_routes(rate_limiter: Arc<RateLimiter>) -> Router<AppState> {
    Router::new()
        .nest("/phases", phases::router())
        .nest("/modules", modules::router())
        .nest("/content", content::router(rate_limiter))
        .nest("/users", users::router())
        .nest("/enrollments", enrollments::router())
        .nest("/dashboard", dashboard::router())
}
