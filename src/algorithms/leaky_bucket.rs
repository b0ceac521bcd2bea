//! The leaky bucket: a queue drained at a constant rate.
//!
//! In contrast to the token bucket, which banks idle time as burstable
//! credit, the leaky bucket releases capacity strictly one slot per leak
//! interval once it is saturated, smoothing offered bursts into a constant
//! output rate.

use std::time::Duration;

use crate::RateLimitInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeakyBucket {
    capacity: u32,
    /// Time for one queued request to leak out, `window / capacity`.
    interval: Duration,
    queue: u32,
    /// Reference point for the leak schedule. Advances only by whole leak
    /// intervals, so fractional drain progress is never lost between
    /// observations; re-anchors to `now` whenever the queue empties.
    last_leak: Option<Duration>,
}

impl LeakyBucket {
    pub(crate) fn new(capacity: u32, window: Duration) -> LeakyBucket {
        LeakyBucket {
            capacity,
            interval: window / capacity,
            queue: 0,
            last_leak: None,
        }
    }

    /// Applies the leaks that occurred up to `now`; returns the new anchor
    /// and queue depth. A clock reading older than the anchor is clamped
    /// to no time elapsed.
    fn leaked(&self, now: Duration) -> (Duration, u32) {
        let last = self.last_leak.unwrap_or(now);
        let now = now.max(last);
        let steps = (now - last).as_nanos() / self.interval.as_nanos();
        if steps >= u128::from(self.queue) {
            (now, 0)
        } else {
            let steps = steps as u32;
            (last + self.interval * steps, self.queue - steps)
        }
    }

    pub(crate) fn allow(&mut self, now: Duration) -> RateLimitInfo {
        let (anchor, queue) = self.leaked(now);
        self.last_leak = Some(anchor);
        if queue < self.capacity {
            self.queue = queue + 1;
            // The queue is fully drained `queue` leak intervals from the
            // anchor.
            RateLimitInfo::allowed(
                self.capacity - self.queue,
                anchor + self.interval * self.queue,
                "queue slot available",
            )
        } else {
            self.queue = queue;
            RateLimitInfo::rejected(anchor + self.interval, "queue full")
        }
    }

    pub(crate) fn remaining_quota(&self, now: Duration) -> u32 {
        let (_, queue) = self.leaked(now);
        self.capacity - queue
    }

    pub(crate) fn reset(&mut self) {
        self.queue = 0;
        self.last_leak = None;
    }
}
