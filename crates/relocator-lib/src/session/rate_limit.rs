//! Client-side rate limiting for cluster API calls
//!
//! Token bucket: `burst` requests may go out back to back, after which
//! tokens refill at `qps` per second.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Slowest refill rate a bucket accepts, in tokens per second
const MIN_QPS: f64 = 0.001;

/// Token bucket state
#[derive(Clone, Debug)]
pub(crate) struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
}

impl TokenBucket {
    /// Rates below `MIN_QPS` (and NaN) are raised to it; burst is at least 1
    pub(crate) fn new(qps: f64, burst: u32, now: Instant) -> Self {
        let burst = burst.max(1) as f64;
        Self {
            tokens: burst,
            last_refill: now,
            max_tokens: burst,
            refill_rate: qps.max(MIN_QPS),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;
    }

    /// Take a token, or report how long until one is available
    pub(crate) fn try_consume(&mut self, now: Instant) -> Result<(), Duration> {
        self.refill(now);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let seconds = (1.0 - self.tokens) / self.refill_rate;
            Err(Duration::from_secs_f64(seconds.max(0.0)))
        }
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.tokens.floor() as u32
    }
}

/// Shared rate limiter; clones draw from the same bucket
#[derive(Clone, Debug)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
}

impl RateLimiter {
    pub fn new(qps: f64, burst: u32) -> Self {
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket::new(qps, burst, Instant::now()))),
        }
    }

    /// Wait until a request may be sent
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                match bucket.try_consume(Instant::now()) {
                    Ok(()) => return,
                    Err(wait) => wait,
                }
            };
            debug!(wait_ms = wait.as_millis() as u64, "Client-side rate limit reached");
            tokio::time::sleep(wait).await;
        }
    }

    /// Tokens currently available without waiting
    pub async fn available(&self) -> u32 {
        let mut bucket = self.bucket.lock().await;
        bucket.refill(Instant::now());
        bucket.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_is_available_immediately() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(20.0, 30, start);

        for _ in 0..30 {
            assert!(bucket.try_consume(start).is_ok());
        }
        let wait = bucket.try_consume(start).unwrap_err();
        assert!(wait > Duration::from_millis(49) && wait <= Duration::from_millis(50));
    }

    #[test]
    fn test_tokens_refill_at_qps() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(20.0, 30, start);
        for _ in 0..30 {
            bucket.try_consume(start).unwrap();
        }

        let later = start + Duration::from_millis(500);
        for _ in 0..10 {
            assert!(bucket.try_consume(later).is_ok());
        }
        assert!(bucket.try_consume(later).is_err());
    }

    #[test]
    fn test_refill_is_capped_at_burst() {
        let start = Instant::now();
        let mut bucket = TokenBucket::new(20.0, 30, start);
        bucket.refill(start + Duration::from_secs(60));
        assert_eq!(bucket.remaining(), 30);
    }

    #[test]
    fn test_non_positive_qps_is_clamped() {
        let start = Instant::now();
        for qps in [0.0, -5.0, f64::NAN] {
            let mut bucket = TokenBucket::new(qps, 0, start);
            assert!(bucket.try_consume(start).is_ok());
            let wait = bucket.try_consume(start).unwrap_err();
            assert!(wait > Duration::from_secs(999) && wait < Duration::from_secs(1001));
        }
    }

    #[test]
    fn test_limiter_clones_share_bucket() {
        let limiter = RateLimiter::new(20.0, 2);
        let other = limiter.clone();

        tokio_test::block_on(async {
            limiter.acquire().await;
            other.acquire().await;
            assert_eq!(limiter.available().await, 0);
        });
    }

    #[test]
    fn test_zero_qps_limiter_still_grants_first_request() {
        let limiter = RateLimiter::new(0.0, 0);
        tokio_test::block_on(limiter.acquire());
        assert_eq!(tokio_test::block_on(limiter.available()), 0);
    }
}
