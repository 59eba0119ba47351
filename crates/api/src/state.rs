use std::sync::Arc;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: htw_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Per-client request counters for the learner content route.
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(pool: htw_db::DbPool, config: ServerConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(
            config.rate_limit_policy(),
            config.trust_proxy_headers,
        ));
        Self {
            pool,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}
