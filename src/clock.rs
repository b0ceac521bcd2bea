//! Time sources for the rate limiter.
//!
//! The algorithms never read the wall clock ambiently; every check takes an
//! explicit reading supplied by one of these clocks (or directly by the
//! caller through the registry's `*_at` methods). A reading is a `Duration`
//! offset from an epoch the clock itself defines, which keeps window
//! arithmetic deterministic and lets tests drive time by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic time source used by the registry.
///
/// Readings must never decrease between calls on the same clock. Should a
/// caller nonetheless hand an older reading to a `*_at` method (wall clocks
/// do occasionally step backward), the algorithms clamp it to "no time
/// elapsed" rather than erroring; see the crate-level docs.
pub trait Clock: Send + Sync {
    /// Returns a measurement of the clock, as an offset from its epoch.
    fn now(&self) -> Duration;
}

/// The production time source: `Instant`-backed, with the epoch captured at
/// construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        MonotonicClock {
            epoch: Instant::now(),
        }
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// A manually advanced clock for deterministic tests.
///
/// Clones share the same underlying counter, so a test can keep one handle
/// while the registry owns another:
///
/// ``` rust
/// use std::time::Duration;
/// use ratelimit_registry::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(Duration::from_secs(3));
/// assert_eq!(clock.now(), Duration::from_secs(3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// A clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock starting at the given offset from its epoch.
    pub fn starting_at(now: Duration) -> Self {
        let clock = Self::new();
        clock.set(now);
        clock
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute offset from its epoch.
    pub fn set(&self, to: Duration) {
        self.nanos.store(to.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}
