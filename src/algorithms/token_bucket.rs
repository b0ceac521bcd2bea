//! The token bucket: bursts up to capacity, long-run average of
//! `max_requests / window`.

use std::time::Duration;

use crate::RateLimitInfo;

/// Implements the industry-standard token bucket as a meter.
///
/// Instead of counting fractional tokens, the bucket keeps a fill `level`
/// measured in time: one admission costs `interval = window / capacity` of
/// level, and the level drains in real time. `level == 0` is a full bucket
/// (all `capacity` tokens available); `level == full` is an empty one.
/// The two representations are equivalent, but the time-based one stays in
/// integer `Duration` arithmetic, so the wait reported on rejection is
/// exact.
///
/// # Drip implementation
///
/// No background task updates the bucket; the fill level is recomputed
/// lazily on every call from the elapsed time since the last observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBucket {
    capacity: u32,
    /// Cost of one admission, `window / capacity`.
    interval: Duration,
    /// The empty-bucket line, `interval * capacity`.
    full: Duration,
    level: Duration,
    last_update: Option<Duration>,
}

impl TokenBucket {
    pub(crate) fn new(capacity: u32, window: Duration) -> TokenBucket {
        let interval = window / capacity;
        TokenBucket {
            capacity,
            interval,
            full: interval * capacity,
            level: Duration::ZERO,
            last_update: None,
        }
    }

    /// The fill level after draining for the time elapsed since the last
    /// observation. Returns the (possibly clamped) observation time too:
    /// a clock reading older than the last one counts as no time elapsed.
    fn drained(&self, now: Duration) -> (Duration, Duration) {
        let last = self.last_update.unwrap_or(now);
        let now = now.max(last);
        (now, self.level.saturating_sub(now - last))
    }

    fn quota(&self, level: Duration) -> u32 {
        ((self.full - level).as_nanos() / self.interval.as_nanos()) as u32
    }

    pub(crate) fn allow(&mut self, now: Duration) -> RateLimitInfo {
        let (now, level) = self.drained(now);
        self.last_update = Some(now);
        if level + self.interval <= self.full {
            self.level = level + self.interval;
            // Quota is fully restored once the level drains back to zero.
            RateLimitInfo::allowed(self.quota(self.level), now + self.level, "token available")
        } else {
            self.level = level;
            let wait = (level + self.interval) - self.full;
            RateLimitInfo::rejected(now + wait, "token bucket empty")
        }
    }

    pub(crate) fn remaining_quota(&self, now: Duration) -> u32 {
        let (_, level) = self.drained(now);
        self.quota(level)
    }

    pub(crate) fn reset(&mut self) {
        self.level = Duration::ZERO;
        self.last_update = None;
    }
}
