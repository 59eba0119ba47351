//! `GET /health`: database reachability plus a snapshot of the learner
//! rate limiter, served outside `/api` for load balancers.

use std::time::Instant;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` when the database answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
    pub rate_limiter: RateLimiterHealth,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub healthy: bool,
    /// Round trip of the `SELECT 1` check; absent when it failed.
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimiterHealth {
    pub tracked_clients: usize,
    pub max_requests: u32,
    pub window_secs: u64,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let started = Instant::now();
    let database = match htw_db::health_check(&state.pool).await {
        Ok(()) => DatabaseHealth {
            healthy: true,
            latency_ms: Some(started.elapsed().as_millis() as u64),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            DatabaseHealth {
                healthy: false,
                latency_ms: None,
            }
        }
    };

    let rate_limiter = RateLimiterHealth {
        tracked_clients: state.rate_limiter.tracked_clients().await,
        max_requests: state.config.rate_limit_max_requests,
        window_secs: state.config.rate_limit_window_secs,
    };

    Json(HealthResponse {
        status: if database.healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        rate_limiter,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
