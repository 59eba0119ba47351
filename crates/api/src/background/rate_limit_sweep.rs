//! Periodic removal of closed rate limit windows.
//!
//! Without the sweep the limiter would keep one entry for every client IP
//! ever seen. Runs on a fixed interval using `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::middleware::rate_limit::RateLimiter;

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(limiter: Arc<RateLimiter>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Rate limit sweep started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Rate limit sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let removed = limiter.purge_expired().await;
                if removed > 0 {
                    let remaining = limiter.tracked_clients().await;
                    tracing::debug!(removed, remaining, "Rate limit sweep: dropped closed windows");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use htw_core::rate_limit::RateLimitPolicy;

    use super::*;

    #[tokio::test]
    async fn sweep_purges_and_stops_on_cancel() {
        let limiter = Arc::new(RateLimiter::new(
            RateLimitPolicy {
                max_requests: 5,
                window: Duration::ZERO,
            },
            true,
        ));
        limiter.check("203.0.113.1").await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            Arc::clone(&limiter),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(limiter.tracked_clients().await, 0);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweep stops after cancel")
            .unwrap();
    }
}
