//! Sliding-window request quota shared by every registry call.
//!
//! One `RateLimiter` is created per client and handed to each component as an
//! `Arc`. It remembers when each of the last `quota` permits was granted; a
//! caller that would push the count inside any window past the quota sleeps
//! until the oldest permit leaves the window. The log sits behind an async
//! mutex that stays locked during that sleep, so concurrent callers queue up
//! instead of racing the check-then-record.

use leiscope_core::RegistryConfig;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Blocks callers that would exceed `quota` requests per `window`.
#[derive(Debug)]
pub struct RateLimiter {
    quota: u32,
    window: Duration,
    granted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `quota` requests per `window`.
    ///
    /// A zero quota is treated as one so `acquire` can always make progress.
    #[must_use]
    pub fn new(quota: u32, window: Duration) -> Self {
        let quota = quota.max(1);
        Self {
            quota,
            window,
            granted: Mutex::new(VecDeque::with_capacity(
                usize::try_from(quota).unwrap_or(usize::MAX).min(1024),
            )),
        }
    }

    /// Create a limiter from the registry configuration.
    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::new(
            config.rate_limit_quota,
            Duration::from_millis(config.rate_limit_window_ms),
        )
    }

    /// Wait until one more request may be issued, then record it.
    ///
    /// Never fails. Across any span of `window`, at most `quota` calls return.
    pub async fn acquire(&self) {
        let mut granted = self.granted.lock().await;

        loop {
            let now = Instant::now();
            self.expire(&mut granted, now);
            if used(&granted) < self.quota {
                break;
            }
            let Some(&oldest) = granted.front() else {
                break;
            };

            let wait = (oldest + self.window).saturating_duration_since(now);
            tracing::warn!(
                quota = self.quota,
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "Registry rate limit reached, waiting for a permit"
            );
            tokio::time::sleep(wait).await;
        }

        granted.push_back(Instant::now());
        tracing::debug!(
            remaining = self.quota.saturating_sub(used(&granted)),
            quota = self.quota,
            "Rate limit permit acquired"
        );
    }

    /// Permits available right now without waiting.
    pub async fn remaining(&self) -> u32 {
        let mut granted = self.granted.lock().await;
        self.expire(&mut granted, Instant::now());
        self.quota.saturating_sub(used(&granted))
    }

    /// Drop permits granted a full window or more before `now`.
    fn expire(&self, granted: &mut VecDeque<Instant>, now: Instant) {
        while granted
            .front()
            .is_some_and(|&at| now.duration_since(at) >= self.window)
        {
            granted.pop_front();
        }
    }

    /// Configured requests per window.
    #[must_use]
    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// Configured window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }
}

fn used(granted: &VecDeque<Instant>) -> u32 {
    u32::try_from(granted.len()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_acquire_within_quota_does_not_wait() {
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.remaining().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_over_quota_waits_for_window() {
        let limiter = RateLimiter::new(3, Duration::from_secs(1));
        let start = Instant::now();

        for _ in 0..4 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() >= Duration::from_secs(1));
        // the first three permits have left the window
        assert_eq!(limiter.remaining().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry_resets_counter() {
        let limiter = RateLimiter::new(2, Duration::from_millis(500));
        limiter.acquire().await;
        limiter.acquire().await;

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(limiter.remaining().await, 2);

        let before = Instant::now();
        limiter.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquire_never_exceeds_quota() {
        let limiter = Arc::new(RateLimiter::new(5, Duration::from_secs(1)));
        let start = Instant::now();

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    limiter.acquire().await;
                    start.elapsed()
                })
            })
            .collect();

        let mut elapsed = Vec::new();
        for handle in handles {
            elapsed.push(handle.await.expect("task completes"));
        }

        let first_window = elapsed
            .iter()
            .filter(|e| **e < Duration::from_secs(1))
            .count();
        let second_window = elapsed
            .iter()
            .filter(|e| **e >= Duration::from_secs(1) && **e < Duration::from_secs(2))
            .count();

        assert_eq!(first_window, 5);
        assert_eq!(second_window, 5);
        assert_eq!(elapsed.len(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_burst_across_window_boundary() {
        let limiter = RateLimiter::new(2, Duration::from_millis(1_000));

        tokio::time::sleep(Duration::from_millis(999)).await;
        limiter.acquire().await;
        limiter.acquire().await;
        let first = Instant::now();

        tokio::time::sleep(Duration::from_millis(1)).await;
        limiter.acquire().await;
        assert!(Instant::now() >= first + Duration::from_millis(1_000));

        limiter.acquire().await;
        assert!(Instant::now() < first + Duration::from_millis(1_010));
    }

    #[tokio::test(start_paused = true)]
    async fn test_any_window_holds_at_most_quota() {
        let window = Duration::from_millis(1_000);
        let limiter = RateLimiter::new(3, window);
        let gaps = [0, 400, 0, 550, 0, 0, 300, 900, 10, 0, 700, 0];

        let mut granted = Vec::new();
        for gap in gaps {
            tokio::time::sleep(Duration::from_millis(gap)).await;
            limiter.acquire().await;
            granted.push(Instant::now());
        }

        for &at in &granted {
            let in_window = granted
                .iter()
                .filter(|&&other| other >= at && other < at + window)
                .count();
            assert!(in_window <= 3, "{in_window} permits inside one window");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_recovers_as_permits_age() {
        let limiter = RateLimiter::new(2, Duration::from_millis(1_000));
        limiter.acquire().await;
        tokio::time::sleep(Duration::from_millis(600)).await;
        limiter.acquire().await;
        assert_eq!(limiter.remaining().await, 0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(limiter.remaining().await, 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(limiter.remaining().await, 2);
    }

    #[test]
    fn test_from_config() {
        let limiter = RateLimiter::from_config(&RegistryConfig::default());
        assert_eq!(limiter.quota(), 60);
        assert_eq!(limiter.window(), Duration::from_secs(60));
    }

    #[test]
    fn test_zero_quota_clamped() {
        let limiter = RateLimiter::new(0, Duration::from_secs(1));
        assert_eq!(limiter.quota(), 1);
    }
}
