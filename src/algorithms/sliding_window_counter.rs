//! The sliding window counter: a two-bucket approximation of the log.
//!
//! Two adjacent epoch-aligned windows are kept. The trailing sliding
//! window overlaps the previous fixed window by a shrinking fraction, and
//! the previous window's count is weighted by that fraction:
//!
//! ```text
//! estimate = current + previous * (1 - (now - window_start) / window)
//! ```
//!
//! A request is admitted iff `estimate < max_requests`. Memory is O(1) per
//! client versus O(window) for the log; the price is a bounded
//! approximation error near window boundaries, which the tests measure
//! against the log algorithm on the same traces.
//!
//! All arithmetic below is the interpolation formula scaled by the window
//! length in nanoseconds, evaluated in integers, so decisions and the
//! `reset_at` instants are exact (no floating point drift).

use std::time::Duration;

use super::{align_to_window, duration_from_nanos};
use crate::RateLimitInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidingWindowCounter {
    max_requests: u32,
    window: Duration,
    current: u32,
    previous: u32,
    window_start: Duration,
}

impl SlidingWindowCounter {
    pub(crate) fn new(max_requests: u32, window: Duration) -> SlidingWindowCounter {
        SlidingWindowCounter {
            max_requests,
            window,
            current: 0,
            previous: 0,
            window_start: Duration::ZERO,
        }
    }

    /// Rolls the buckets forward so `now` falls inside the current window;
    /// returns `(window_start, previous, current)`. Window starts stay
    /// epoch-aligned.
    fn rolled(&self, now: Duration) -> (Duration, u32, u32) {
        let end = self.window_start + self.window;
        if now >= end + self.window {
            // Idle for a full window or more: both buckets are stale.
            (align_to_window(now, self.window), 0, 0)
        } else if now >= end {
            (end, self.current, 0)
        } else {
            (self.window_start, self.previous, self.current)
        }
    }

    /// The interpolated estimate scaled by `window` nanoseconds. A clock
    /// reading before `start` clamps the overlap to the full previous
    /// window.
    fn scaled_estimate(&self, start: Duration, previous: u32, current: u32, now: Duration) -> u128 {
        let w = self.window.as_nanos();
        let offset = now.saturating_sub(start).as_nanos().min(w);
        u128::from(current) * w + u128::from(previous) * (w - offset)
    }

    pub(crate) fn allow(&mut self, now: Duration) -> RateLimitInfo {
        let (start, previous, current) = self.rolled(now);
        self.window_start = start;
        self.previous = previous;
        self.current = current;

        let w = self.window.as_nanos();
        let scaled = self.scaled_estimate(start, previous, current, now);
        if scaled < u128::from(self.max_requests) * w {
            self.current += 1;
            let estimate_ceil = ((scaled + w - 1) / w) as u32;
            RateLimitInfo::allowed(
                self.max_requests.saturating_sub(estimate_ceil + 1),
                start + self.window,
                "within sliding window estimate",
            )
        } else {
            RateLimitInfo::rejected(
                self.next_admission(start, previous, current),
                "sliding window estimate at limit",
            )
        }
    }

    /// Earliest instant at which the decaying estimate drops below the
    /// limit, assuming no further admissions. Exact: calling `allow` at
    /// the returned time is guaranteed to succeed.
    fn next_admission(&self, start: Duration, previous: u32, current: u32) -> Duration {
        let w = self.window.as_nanos();
        let max = u128::from(self.max_requests);
        let cur = u128::from(current);
        if cur >= max {
            // The current bucket alone saturates the limit; capacity can
            // only free after the rollover, once `current` becomes the
            // decaying bucket. Solve cur * (w - off) < max * w for the
            // smallest integer off.
            let r = max * w;
            let q = r / cur;
            let off = if r % cur == 0 { w - q + 1 } else { w - q };
            start + self.window + duration_from_nanos(off.min(w))
        } else {
            // previous > 0 here, otherwise the estimate could not have
            // reached the limit. Solve previous * (w - off) <
            // (max - current) * w within this window; off == w lands on
            // the rollover itself, which also frees capacity.
            let prev = u128::from(previous);
            let r = (max - cur) * w;
            let q = r / prev;
            let off = if r % prev == 0 { w - q + 1 } else { w - q };
            start + duration_from_nanos(off.min(w))
        }
    }

    pub(crate) fn remaining_quota(&self, now: Duration) -> u32 {
        let (start, previous, current) = self.rolled(now);
        let w = self.window.as_nanos();
        let scaled = self.scaled_estimate(start, previous, current, now);
        // Both buckets together can exceed u32::MAX for extreme limits;
        // the subtraction saturates at zero either way.
        let estimate_ceil = ((scaled + w - 1) / w).min(u128::from(u32::MAX)) as u32;
        self.max_requests.saturating_sub(estimate_ceil)
    }

    pub(crate) fn reset(&mut self) {
        self.current = 0;
        self.previous = 0;
        self.window_start = Duration::ZERO;
    }
}
