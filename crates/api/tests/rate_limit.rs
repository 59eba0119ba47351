//! HTTP-level tests for the learner content rate limit and id validation.
//!
//! Malformed module ids are rejected before any database access, so these
//! run against a pool that never connects. The limiter sits in front of
//! the id check, which lets the tests count requests without Postgres.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use common::{body_json, get_with_headers};
use htw_api::config::ServerConfig;
use htw_api::middleware::rate_limit::{limit_by_client, RateLimiter};
use htw_core::rate_limit::RateLimitPolicy;

const MALFORMED: &str = "/api/content/module/not-an-object-id";

fn app_with_limit(max_requests: u32) -> Router {
    let config = ServerConfig {
        rate_limit_max_requests: max_requests,
        ..common::test_config()
    };
    common::build_test_app_with_config(common::unreachable_pool(), config)
}

#[tokio::test]
async fn malformed_module_id_returns_400_invalid_id() {
    let app = app_with_limit(100);

    let response = get_with_headers(app, MALFORMED, &[("x-forwarded-for", "203.0.113.1")]).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["x-ratelimit-limit"], "100");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "99");
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "INVALID_ID");
}

#[tokio::test]
async fn hundred_and_first_request_is_rejected() {
    let app = app_with_limit(100);
    let client = [("x-forwarded-for", "203.0.113.2")];

    for i in 0..100 {
        let response = get_with_headers(app.clone(), MALFORMED, &client).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "request {i} should pass the limiter"
        );
    }

    let response = get_with_headers(app, MALFORMED, &client).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    let retry_after: u64 = response.headers()["retry-after"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 900);

    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");
    assert_eq!(json["message"], "Too many requests, please try again later.");
}

#[tokio::test]
async fn clients_are_limited_independently() {
    let app = app_with_limit(2);

    for _ in 0..2 {
        get_with_headers(app.clone(), MALFORMED, &[("x-forwarded-for", "198.51.100.1")]).await;
    }
    let blocked =
        get_with_headers(app.clone(), MALFORMED, &[("x-forwarded-for", "198.51.100.1")]).await;
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    let other = get_with_headers(app.clone(), MALFORMED, &[("x-real-ip", "198.51.100.2")]).await;
    assert_eq!(other.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn other_content_routes_are_not_limited() {
    let app = app_with_limit(1);
    let client = [("x-forwarded-for", "192.0.2.50")];

    for _ in 0..3 {
        let response =
            get_with_headers(app.clone(), "/api/content/module/bad/sections", &client).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get("x-ratelimit-limit").is_none());
    }
}

#[tokio::test]
async fn window_reopens_after_expiry() {
    let limiter = Arc::new(RateLimiter::new(
        RateLimitPolicy {
            max_requests: 1,
            window: std::time::Duration::from_millis(100),
        },
        true,
    ));
    let app = Router::new()
        .route("/ping", get(|| async { "ok" }))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&limiter),
            limit_by_client,
        ));

    let ok = get_with_headers(app.clone(), "/ping", &[]).await;
    assert_eq!(ok.status(), StatusCode::OK);
    let blocked = get_with_headers(app.clone(), "/ping", &[]).await;
    assert_eq!(blocked.status(), StatusCode::TOO_MANY_REQUESTS);

    tokio::time::sleep(std::time::Duration::from_millis(150)).await;
    let reopened = get_with_headers(app, "/ping", &[]).await;
    assert_eq!(reopened.status(), StatusCode::OK);
}

#[tokio::test]
async fn rotating_forwarded_for_is_ignored_without_trusted_proxy() {
    let config = ServerConfig {
        rate_limit_max_requests: 2,
        trust_proxy_headers: false,
        ..common::test_config()
    };
    let app = common::build_test_app_with_config(common::unreachable_pool(), config);

    for client in ["203.0.113.1", "203.0.113.2"] {
        let response = get_with_headers(app.clone(), MALFORMED, &[("x-forwarded-for", client)]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response =
        get_with_headers(app, MALFORMED, &[("x-forwarded-for", "203.0.113.3")]).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
