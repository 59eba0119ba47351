use std::time::Duration;

use htw_core::rate_limit::{RateLimitPolicy, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Requests admitted per client per window on rate-limited routes.
    pub rate_limit_max_requests: u32,
    /// Rate limit window length in seconds (default: `900`).
    pub rate_limit_window_secs: u64,
    /// How often closed rate limit windows are swept, in seconds.
    pub rate_limit_sweep_secs: u64,
    /// Key clients by `X-Forwarded-For`/`X-Real-IP` (default: `true`).
    /// Disable when the server is reachable without a trusted proxy in front.
    pub trust_proxy_headers: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                    |
    /// | `RATE_LIMIT_MAX_REQUESTS` | `100`                   |
    /// | `RATE_LIMIT_WINDOW_SECS`  | `900`                   |
    /// | `RATE_LIMIT_SWEEP_SECS`   | `60`                    |
    /// | `TRUST_PROXY_HEADERS`     | `true`                  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        Self {
            host,
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            rate_limit_max_requests: env_or("RATE_LIMIT_MAX_REQUESTS", DEFAULT_MAX_REQUESTS),
            rate_limit_window_secs: env_or("RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW.as_secs()),
            rate_limit_sweep_secs: env_or("RATE_LIMIT_SWEEP_SECS", 60),
            trust_proxy_headers: env_or("TRUST_PROXY_HEADERS", true),
        }
    }

    /// Policy applied by the learner content rate limiter.
    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            max_requests: self.rate_limit_max_requests,
            window: Duration::from_secs(self.rate_limit_window_secs),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: vec!["http://localhost:5173".into()],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            rate_limit_max_requests: DEFAULT_MAX_REQUESTS,
            rate_limit_window_secs: DEFAULT_WINDOW.as_secs(),
            rate_limit_sweep_secs: 60,
            trust_proxy_headers: true,
        }
    }
}

/// Read and parse `key`, falling back to `default` when unset.
///
/// Panics on a value that does not parse: misconfiguration should fail
/// at startup rather than silently use a default.
fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be valid: {e}")),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" http://a.test, ,http://b.test "),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn default_policy_matches_learner_limit() {
        let policy = ServerConfig::default().rate_limit_policy();
        assert_eq!(policy.max_requests, 100);
        assert_eq!(policy.window, Duration::from_secs(900));
    }
}
