//! Minimum spacing between calls to the same service.

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Keyed rate limiter shared by every caller of a service.
///
/// Each call reserves the next free slot for its key before sleeping, so
/// concurrent callers are spaced out instead of all waking at once.
pub struct RateLimiter {
    min_delay: Duration,
    /// Earliest instant the next call for a key may start.
    next_slot: DashMap<String, Instant>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            next_slot: DashMap::new(),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Wait for this key's next slot.
    pub async fn wait(&self, key: &str) {
        if self.min_delay.is_zero() {
            return;
        }

        // The entry guard is dropped before sleeping
        let slot = {
            let now = Instant::now();
            let mut next = self.next_slot.entry(key.to_string()).or_insert(now);
            let slot = (*next).max(now);
            *next = slot + self.min_delay;
            slot
        };

        sleep_until(slot).await;
    }

    pub fn tracked_keys(&self) -> usize {
        self.next_slot.len()
    }
}
