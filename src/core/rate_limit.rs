//! Process-wide throttle for market data calls.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum interval between consecutive provider calls.
///
/// A single limiter is shared by every material in every request, so the
/// interval holds globally rather than per symbol. Time is read from the
/// tokio clock.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Time left before the next call may be issued.
    pub async fn remaining(&self) -> Duration {
        let last_call = self.last_call.lock().await;
        match *last_call {
            Some(at) => (at + self.min_interval).saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        }
    }

    /// Waits until the interval since the last recorded call has elapsed.
    pub async fn until_ready(&self) {
        let wait = self.remaining().await;
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "Rate limit wait");
            tokio::time::sleep(wait).await;
        }
    }

    /// Marks a call as dispatched now.
    pub async fn record_call(&self) {
        *self.last_call.lock().await = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_not_delayed() {
        let limiter = RateLimiter::new(Duration::from_secs(12));
        let start = Instant::now();

        limiter.until_ready().await;

        assert_eq!(Instant::now(), start);
        assert_eq!(limiter.remaining().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_counts_down_from_last_call() {
        let limiter = RateLimiter::new(Duration::from_secs(12));
        limiter.record_call().await;
        assert_eq!(limiter.remaining().await, Duration::from_secs(12));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(limiter.remaining().await, Duration::from_secs(7));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(limiter.remaining().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_until_ready_waits_for_full_interval() {
        let limiter = RateLimiter::new(Duration::from_secs(12));
        limiter.record_call().await;
        let recorded = Instant::now();

        limiter.until_ready().await;

        assert!(Instant::now() - recorded >= Duration::from_secs(12));
    }
}
