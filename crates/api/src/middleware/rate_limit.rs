//! Per-client fixed-window rate limiting.
//!
//! Clients are identified by IP: the first `X-Forwarded-For` entry, then
//! `X-Real-IP`, then the socket peer address. The proxy headers are only
//! consulted when the limiter is configured to trust them. Allowed responses carry the
//! remaining budget in `X-RateLimit-*` headers; rejected requests get 429
//! with `Retry-After`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use htw_core::rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimitTable};
use tokio::sync::Mutex;

use crate::error::AppError;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Key used when no client address can be determined.
const UNKNOWN_CLIENT: &str = "unknown";

/// Shared request counters, one window per client key.
#[derive(Debug)]
pub struct RateLimiter {
    table: Mutex<RateLimitTable>,
    trust_proxy_headers: bool,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy, trust_proxy_headers: bool) -> Self {
        Self {
            table: Mutex::new(RateLimitTable::new(policy)),
            trust_proxy_headers,
        }
    }

    /// Count one request from `key` against its current window.
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        self.table.lock().await.check(key, Instant::now())
    }

    /// Drop closed windows. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.table.lock().await.purge_expired(Instant::now())
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.table.lock().await.len()
    }
}

/// Resolve the rate limit key for a request.
///
/// With `trust_proxy_headers` off the key is always the peer address, so a
/// client cannot pick its own key.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    let peer_key = || peer.map(|addr| addr.ip().to_string());
    if !trust_proxy_headers {
        return peer_key().unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
    }

    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .map(str::to_string)
        .or_else(peer_key)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Middleware: admit the request if the client has budget left.
///
/// Mount with `axum::middleware::from_fn_with_state(limiter, limit_by_client)`.
pub async fn limit_by_client(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer, limiter.trust_proxy_headers);

    let decision = limiter.check(&key).await;
    if !decision.allowed {
        tracing::warn!(client = %key, limit = decision.limit, "Rate limit exceeded");
        return AppError::RateLimited {
            limit: decision.limit,
            retry_after_secs: decision.retry_after_secs(),
        }
        .into_response();
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn forwarded_for_first_entry_wins() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        assert_eq!(client_key(&h, None, true), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_real_ip_then_peer() {
        let peer: SocketAddr = "192.0.2.9:55000".parse().unwrap();
        assert_eq!(
            client_key(&headers(&[("x-real-ip", "198.51.100.2")]), Some(peer), true),
            "198.51.100.2"
        );
        assert_eq!(client_key(&HeaderMap::new(), Some(peer), true), "192.0.2.9");
        assert_eq!(client_key(&HeaderMap::new(), None, true), "unknown");
    }

    #[test]
    fn untrusted_proxy_headers_are_ignored() {
        let peer: SocketAddr = "192.0.2.9:55000".parse().unwrap();
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.7"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        assert_eq!(client_key(&h, Some(peer), false), "192.0.2.9");
        assert_eq!(client_key(&h, None, false), "unknown");
    }

    #[tokio::test]
    async fn limiter_tracks_and_purges_clients() {
        let limiter = RateLimiter::new(
            RateLimitPolicy {
                max_requests: 1,
                window: std::time::Duration::ZERO,
            },
            true,
        );
        assert!(limiter.check("a").await.allowed);
        assert_eq!(limiter.tracked_clients().await, 1);
        assert_eq!(limiter.purge_expired().await, 1);
        assert_eq!(limiter.tracked_clients().await, 0);
    }
}
