//! Minimum-spacing rate gate for outbound API requests.
//!
//! Every request through a client passes the same gate, whatever endpoint it
//! targets. Slots are reserved under a short lock before the caller sleeps,
//! so concurrent callers are dispatched one spacing apart.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Rate gate enforcing a minimum interval between dispatches
#[derive(Debug)]
pub struct RateLimiter {
    /// Shortest permitted interval between two dispatches
    min_interval: Duration,
    /// Dispatch instant of the most recently reserved slot
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Wait until a request can be made and return its dispatch instant
    pub async fn acquire(&self) -> Instant {
        let slot = self.reserve(Instant::now());

        let now = Instant::now();
        if slot > now {
            tracing::debug!(
                wait_ms = (slot - now).as_millis() as u64,
                "Rate limit: waiting for minimum spacing"
            );
            sleep_until(slot).await;
        }

        slot
    }

    /// Record the next free slot at or after `now`
    fn reserve(&self, now: Instant) -> Instant {
        let mut last = self.last_request.lock();
        let slot = match *last {
            Some(previous) => now.max(previous + self.min_interval),
            None => now,
        };
        *last = Some(slot);
        slot
    }

    /// Configured minimum spacing
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Instant of the last reserved dispatch, if any
    pub fn last_request(&self) -> Option<Instant> {
        *self.last_request.lock()
    }
}
