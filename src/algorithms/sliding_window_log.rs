//! The sliding window log: exact trailing-window limiting.
//!
//! One timestamp is kept per admitted request and pruned once it falls out
//! of the trailing window. Exact, at O(window) memory and per-call cost;
//! this is the ground-truth algorithm the two-bucket counter approximation
//! is validated against.

use std::collections::VecDeque;
use std::time::Duration;

use crate::RateLimitInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidingWindowLog {
    max_requests: u32,
    window: Duration,
    /// Admission timestamps, oldest first. Never longer than
    /// `max_requests` after pruning.
    log: VecDeque<Duration>,
}

impl SlidingWindowLog {
    pub(crate) fn new(max_requests: u32, window: Duration) -> SlidingWindowLog {
        SlidingWindowLog {
            max_requests,
            window,
            log: VecDeque::with_capacity(max_requests as usize),
        }
    }

    /// Discards entries with `timestamp <= now - window`.
    fn prune(&mut self, now: Duration) {
        if let Some(cutoff) = now.checked_sub(self.window) {
            while self.log.front().map_or(false, |&t| t <= cutoff) {
                self.log.pop_front();
            }
        }
    }

    pub(crate) fn allow(&mut self, now: Duration) -> RateLimitInfo {
        // Keep the log ordered even if the clock steps backward.
        let now = self.log.back().map_or(now, |&newest| now.max(newest));
        self.prune(now);
        let used = self.log.len() as u32;
        if used < self.max_requests {
            self.log.push_back(now);
            let oldest = self.log.front().copied().unwrap_or(now);
            RateLimitInfo::allowed(
                self.max_requests - used - 1,
                oldest + self.window,
                "within sliding window",
            )
        } else {
            // Capacity frees when the oldest retained entry expires.
            let oldest = self.log.front().copied().unwrap_or(now);
            RateLimitInfo::rejected(oldest + self.window, "sliding window full")
        }
    }

    pub(crate) fn remaining_quota(&self, now: Duration) -> u32 {
        let cutoff = now.checked_sub(self.window);
        let live = self
            .log
            .iter()
            .filter(|&&t| cutoff.map_or(true, |c| t > c))
            .count() as u32;
        self.max_requests - live
    }

    pub(crate) fn reset(&mut self) {
        self.log.clear();
    }
}
