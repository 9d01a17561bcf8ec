//! # Rate Limiter
//!
//! Period rate limiter for diagnostics that may repeat at network speed.
//!
//! A misbehaving peer can trigger the same anomaly for every event it
//! creates. The limiter lets one occurrence through per period and counts
//! the rest so the next permitted log line can report how many were hidden.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Allows at most one action per period.
///
/// # Algorithm
///
/// - The first call is always allowed
/// - Later calls are allowed once `period` has elapsed since the last allowed call
/// - Denied calls are counted and the count is handed to the next allowed call
pub struct RateLimiter {
    /// Minimum time between two allowed actions.
    period: Duration,
    /// Instant of the last allowed action.
    last_allowed: Mutex<Option<Instant>>,
    /// Denied calls since the last allowed action.
    suppressed: AtomicU64,
}

impl RateLimiter {
    /// Create a new rate limiter allowing one action per `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_allowed: Mutex::new(None),
            suppressed: AtomicU64::new(0),
        }
    }

    /// Try to perform the action.
    ///
    /// Returns `Some(suppressed)` when allowed, where `suppressed` is the number
    /// of denied calls since the previous allowed one, and `None` when denied.
    pub fn try_acquire(&self) -> Option<u64> {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> Option<u64> {
        let mut last = self.last_allowed.lock();
        let allowed = match *last {
            None => true,
            Some(previous) => now.saturating_duration_since(previous) >= self.period,
        };

        if allowed {
            *last = Some(now);
            Some(self.suppressed.swap(0, Ordering::Relaxed))
        } else {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Number of calls denied since the last allowed one.
    pub fn suppressed(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }
}

/// Pre-configured rate limiters for common use cases.
pub mod presets {
    use super::RateLimiter;
    use std::time::Duration;

    /// Anomaly logging (one line per minute).
    pub fn anomaly_log() -> RateLimiter {
        RateLimiter::new(Duration::from_secs(60))
    }

    /// Unlimited, every call is allowed.
    pub fn unlimited() -> RateLimiter {
        RateLimiter::new(Duration::ZERO)
    }
}
