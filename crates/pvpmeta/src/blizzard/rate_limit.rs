use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tokio::time::Instant;

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default upstream limits, per credential.
pub mod rate_limits {
    /// Hard limit is 100/s; stay just under it.
    pub const DEFAULT_RPS: u32 = 95;
    /// Soft hourly quota; exceeding it degrades service upstream.
    pub const DEFAULT_HOURLY_QUOTA: u32 = 36_000;
    /// How long every caller backs off after a 429 slips through.
    pub const PENALTY_SECS: u64 = 2;
}

/// Proactive limiter enforcing both the per-second and the hourly quota.
///
/// Clones share state, so one limiter per region lane keeps a back-off in
/// one region from stalling the other.
///
/// # Example
///
/// ```ignore
/// use pvpmeta::blizzard::ApiRateLimiter;
///
/// let limiter = ApiRateLimiter::new(95, 36_000);
/// limiter.wait().await;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    per_second: Arc<GovernorRateLimiter>,
    hourly: Arc<GovernorRateLimiter>,
    penalty_until: Arc<Mutex<Option<Instant>>>,
}

impl ApiRateLimiter {
    /// Create a limiter. Zero values are treated as 1.
    pub fn new(requests_per_second: u32, hourly_quota: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let hourly = NonZeroU32::new(hourly_quota).unwrap_or(NonZeroU32::MIN);

        Self {
            per_second: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
            hourly: Arc::new(RateLimiter::direct(Quota::per_hour(hourly))),
            penalty_until: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait until a request is allowed by both buckets and any penalty has expired.
    pub async fn wait(&self) {
        if let Some(until) = self.penalty_deadline() {
            tokio::time::sleep_until(until).await;
        }
        self.per_second.until_ready().await;
        self.hourly.until_ready().await;
    }

    /// Make every caller back off for `drain`.
    ///
    /// Called when a real 429 gets through despite proactive limiting, to
    /// stop a cascade of further 429s from concurrent workers.
    pub fn penalize(&self, drain: Duration) {
        let until = Instant::now() + drain;
        let mut guard = self.penalty_until.lock().unwrap_or_else(|e| e.into_inner());
        match *guard {
            Some(existing) if existing >= until => {}
            _ => *guard = Some(until),
        }
        tracing::debug!(drain_ms = drain.as_millis() as u64, "Rate limiter penalized");
    }

    fn penalty_deadline(&self) -> Option<Instant> {
        let guard = self.penalty_until.lock().unwrap_or_else(|e| e.into_inner());
        guard.filter(|until| *until > Instant::now())
    }
}

impl Default for ApiRateLimiter {
    fn default() -> Self {
        Self::new(rate_limits::DEFAULT_RPS, rate_limits::DEFAULT_HOURLY_QUOTA)
    }
}
