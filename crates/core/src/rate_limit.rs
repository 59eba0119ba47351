//! Fixed-window request counting per client key.
//!
//! A window opens at a client's first request and admits
//! `max_requests` requests until `window` has elapsed; the next request
//! after that opens a fresh window. The clock is passed in so the logic
//! stays deterministic under test.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Requests admitted per window by default.
pub const DEFAULT_MAX_REQUESTS: u32 = 100;

/// Default window length: 15 minutes.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Limit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window closes.
    pub reset_after: Duration,
}

impl RateLimitDecision {
    /// Whole seconds a rejected client should wait, at least 1.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        let rounded = if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        };
        rounded.max(1)
    }
}

/// Counter for one client.
#[derive(Debug, Clone, Copy)]
pub struct FixedWindow {
    started_at: Instant,
    count: u32,
}

impl FixedWindow {
    pub fn new(now: Instant) -> Self {
        Self {
            started_at: now,
            count: 0,
        }
    }

    pub fn is_expired(&self, policy: &RateLimitPolicy, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= policy.window
    }

    /// Count one request against this window.
    pub fn hit(&mut self, policy: &RateLimitPolicy, now: Instant) -> RateLimitDecision {
        if self.is_expired(policy, now) {
            *self = Self::new(now);
        }

        let reset_after = policy
            .window
            .saturating_sub(now.saturating_duration_since(self.started_at));

        if self.count >= policy.max_requests {
            return RateLimitDecision {
                allowed: false,
                limit: policy.max_requests,
                remaining: 0,
                reset_after,
            };
        }

        self.count += 1;
        RateLimitDecision {
            allowed: true,
            limit: policy.max_requests,
            remaining: policy.max_requests - self.count,
            reset_after,
        }
    }
}

/// Windows for every client seen, keyed by client identity (usually IP).
#[derive(Debug, Default)]
pub struct RateLimitTable {
    policy: RateLimitPolicy,
    windows: HashMap<String, FixedWindow>,
}

impl RateLimitTable {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            windows: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Count one request from `key`.
    pub fn check(&mut self, key: &str, now: Instant) -> RateLimitDecision {
        let policy = self.policy;
        self.windows
            .entry(key.to_string())
            .or_insert_with(|| FixedWindow::new(now))
            .hit(&policy, now)
    }

    /// Drop windows that have closed. Returns how many were removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.windows.len();
        let policy = self.policy;
        self.windows.retain(|_, w| !w.is_expired(&policy, now));
        before - self.windows.len()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
