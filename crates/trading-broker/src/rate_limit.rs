//! Sliding-window rate limiter for outbound broker calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use trading_core::error::ConfigError;

/// Caps outbound calls at `max_calls` per rolling `period`.
///
/// Callers over quota are delayed until the oldest admission leaves the
/// window; they are never rejected. Clones share the same window, so one
/// limiter can sit in front of every call site that talks to the same API.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    max_calls: usize,
    period: Duration,
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a limiter admitting `max_calls` per `period`.
    pub fn new(max_calls: u32, period: Duration) -> Result<Self, ConfigError> {
        if max_calls == 0 || period.is_zero() {
            return Err(ConfigError::InvalidRateLimit {
                max_calls,
                period_secs: period.as_secs(),
            });
        }

        Ok(Self {
            inner: Arc::new(Inner {
                max_calls: max_calls as usize,
                period,
                window: Mutex::new(VecDeque::with_capacity(max_calls as usize)),
            }),
        })
    }

    /// Wait until a call may be issued, then record it.
    pub async fn admit(&self) {
        loop {
            let wait = {
                let mut window = self.inner.window.lock().await;
                let now = Instant::now();
                self.inner.evict_expired(&mut window, now);

                if window.len() < self.inner.max_calls {
                    window.push_back(now);
                    return;
                }

                // Window is full, so front() is the admission that expires first.
                match window.front() {
                    Some(&oldest) => (oldest + self.inner.period).saturating_duration_since(now),
                    None => Duration::ZERO,
                }
            };

            debug!(
                wait_ms = wait.as_millis() as u64,
                max_calls = self.inner.max_calls,
                period_secs = self.inner.period.as_secs_f64(),
                "Rate limit reached, delaying call"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Number of admissions inside the current window.
    pub async fn in_window(&self) -> usize {
        let mut window = self.inner.window.lock().await;
        self.inner.evict_expired(&mut window, Instant::now());
        window.len()
    }

    pub fn max_calls(&self) -> usize {
        self.inner.max_calls
    }

    pub fn period(&self) -> Duration {
        self.inner.period
    }
}

impl Inner {
    fn evict_expired(&self, window: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = window.front() {
            if now.duration_since(oldest) >= self.period {
                window.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_quota() {
        assert!(matches!(
            RateLimiter::new(0, Duration::from_secs(60)),
            Err(ConfigError::InvalidRateLimit { max_calls: 0, .. })
        ));
        assert!(RateLimiter::new(5, Duration::ZERO).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_third_call_waits_for_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60)).unwrap();
        let start = Instant::now();

        limiter.admit().await;
        limiter.admit().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        limiter.admit().await;
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_plus_one_takes_a_full_period() {
        for (max_calls, period_secs) in [(1, 1), (3, 10), (180, 60)] {
            let period = Duration::from_secs(period_secs);
            let limiter = RateLimiter::new(max_calls, period).unwrap();
            let start = Instant::now();

            for _ in 0..=max_calls {
                limiter.admit().await;
            }

            assert!(start.elapsed() >= period, "{max_calls}/{period_secs}s admitted too fast");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_the_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10)).unwrap();
        let start = Instant::now();

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    limiter.admit().await;
                    start.elapsed()
                })
            })
            .collect();

        let mut admitted_at = Vec::new();
        for handle in handles {
            admitted_at.push(handle.await.unwrap());
        }
        admitted_at.sort();

        // Any two admissions two places apart are at least one period apart.
        for pair in admitted_at.windows(3) {
            assert!(pair[2] - pair[0] >= Duration::from_secs(10));
        }
        assert!(admitted_at[4] >= Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_drains_after_period() {
        let limiter = RateLimiter::new(3, Duration::from_secs(5)).unwrap();
        limiter.admit().await;
        limiter.admit().await;
        assert_eq!(limiter.in_window().await, 2);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(limiter.in_window().await, 0);
    }
}
