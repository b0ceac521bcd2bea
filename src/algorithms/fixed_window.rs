//! The fixed window counter.
//!
//! Windows are aligned to epoch boundaries (`floor(now / window) * window`)
//! rather than to each client's first request, so every client with the
//! same window length rolls over at the same deterministic instants.
//!
//! Known weakness, by construction: a burst straddling a window boundary
//! can admit up to `2 * max_requests` in a short span. That is standard
//! fixed-window behavior; the tests demonstrate it rather than hide it.

use std::time::Duration;

use super::align_to_window;
use crate::RateLimitInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedWindow {
    max_requests: u32,
    window: Duration,
    count: u32,
    window_start: Duration,
}

impl FixedWindow {
    pub(crate) fn new(max_requests: u32, window: Duration) -> FixedWindow {
        FixedWindow {
            max_requests,
            window,
            count: 0,
            window_start: Duration::ZERO,
        }
    }

    /// Window start and count as of `now`. A clock reading before the
    /// current window start counts against the current window.
    fn rolled(&self, now: Duration) -> (Duration, u32) {
        if now >= self.window_start + self.window {
            (align_to_window(now, self.window), 0)
        } else {
            (self.window_start, self.count)
        }
    }

    pub(crate) fn allow(&mut self, now: Duration) -> RateLimitInfo {
        let (start, count) = self.rolled(now);
        self.window_start = start;
        let reset_at = start + self.window;
        if count < self.max_requests {
            self.count = count + 1;
            RateLimitInfo::allowed(self.max_requests - self.count, reset_at, "within window limit")
        } else {
            self.count = count;
            RateLimitInfo::rejected(reset_at, "window limit reached")
        }
    }

    pub(crate) fn remaining_quota(&self, now: Duration) -> u32 {
        let (_, count) = self.rolled(now);
        self.max_requests - count
    }

    pub(crate) fn reset(&mut self) {
        self.count = 0;
        self.window_start = Duration::ZERO;
    }
}
