//! The five admission disciplines behind one closed [`Limiter`] surface.
//!
//! Each variant independently implements the same contract: `allow`
//! consults and mutates the state as of an explicit clock reading and
//! returns a [`RateLimitInfo`]; `remaining_quota` is the read-only
//! projection of the same computation; `reset` returns the state to the
//! fully available baseline (full bucket, empty queue, empty window).
//!
//! All internal window arithmetic is done in integer nanoseconds so that
//! the `reset_at` values handed back on rejection are exact: calling
//! `allow` again at exactly `reset_at` on an otherwise idle limiter is
//! guaranteed to succeed.

mod fixed_window;
mod leaky_bucket;
mod sliding_window_counter;
mod sliding_window_log;
mod token_bucket;

pub use fixed_window::FixedWindow;
pub use leaky_bucket::LeakyBucket;
pub use sliding_window_counter::SlidingWindowCounter;
pub use sliding_window_log::SlidingWindowLog;
pub use token_bucket::TokenBucket;

use std::time::Duration;

use crate::config::{AlgorithmKind, RateLimitConfig};
use crate::errors::RegistryError;
use crate::RateLimitInfo;

/// One client's limiter: a closed set of tagged variants, selected at
/// registration time by [`RateLimitConfig::algorithm`].
///
/// The limiter owns both the derived parameters and the mutable state for
/// a single client; the registry guards each instance with its own lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Limiter {
    TokenBucket(TokenBucket),
    LeakyBucket(LeakyBucket),
    FixedWindow(FixedWindow),
    SlidingWindowLog(SlidingWindowLog),
    SlidingWindowCounter(SlidingWindowCounter),
}

impl Limiter {
    /// Builds the limiter variant named by the config, fully available.
    ///
    /// Fails with [`RegistryError::InvalidConfig`] if the config does not
    /// validate; this is the only point at which configuration errors can
    /// surface, never during `allow`.
    pub fn from_config(config: &RateLimitConfig) -> Result<Limiter, RegistryError> {
        config.validate()?;
        Ok(match config.algorithm {
            AlgorithmKind::TokenBucket => {
                Limiter::TokenBucket(TokenBucket::new(config.max_requests, config.window))
            }
            AlgorithmKind::LeakyBucket => {
                Limiter::LeakyBucket(LeakyBucket::new(config.max_requests, config.window))
            }
            AlgorithmKind::FixedWindow => {
                Limiter::FixedWindow(FixedWindow::new(config.max_requests, config.window))
            }
            AlgorithmKind::SlidingWindowLog => {
                Limiter::SlidingWindowLog(SlidingWindowLog::new(config.max_requests, config.window))
            }
            AlgorithmKind::SlidingWindowCounter => Limiter::SlidingWindowCounter(
                SlidingWindowCounter::new(config.max_requests, config.window),
            ),
        })
    }

    /// Evaluates one request as of `now`, mutating the state. Never waits;
    /// a rejection carries the earliest time capacity frees up again.
    pub fn allow(&mut self, now: Duration) -> RateLimitInfo {
        match self {
            Limiter::TokenBucket(l) => l.allow(now),
            Limiter::LeakyBucket(l) => l.allow(now),
            Limiter::FixedWindow(l) => l.allow(now),
            Limiter::SlidingWindowLog(l) => l.allow(now),
            Limiter::SlidingWindowCounter(l) => l.allow(now),
        }
    }

    /// Read-only projection of the quota available at `now`: how many
    /// requests `allow` would still admit without any time passing.
    pub fn remaining_quota(&self, now: Duration) -> u32 {
        match self {
            Limiter::TokenBucket(l) => l.remaining_quota(now),
            Limiter::LeakyBucket(l) => l.remaining_quota(now),
            Limiter::FixedWindow(l) => l.remaining_quota(now),
            Limiter::SlidingWindowLog(l) => l.remaining_quota(now),
            Limiter::SlidingWindowCounter(l) => l.remaining_quota(now),
        }
    }

    /// Returns the state to the fully available baseline for the variant.
    pub fn reset(&mut self) {
        match self {
            Limiter::TokenBucket(l) => l.reset(),
            Limiter::LeakyBucket(l) => l.reset(),
            Limiter::FixedWindow(l) => l.reset(),
            Limiter::SlidingWindowLog(l) => l.reset(),
            Limiter::SlidingWindowCounter(l) => l.reset(),
        }
    }

    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Limiter::TokenBucket(_) => AlgorithmKind::TokenBucket,
            Limiter::LeakyBucket(_) => AlgorithmKind::LeakyBucket,
            Limiter::FixedWindow(_) => AlgorithmKind::FixedWindow,
            Limiter::SlidingWindowLog(_) => AlgorithmKind::SlidingWindowLog,
            Limiter::SlidingWindowCounter(_) => AlgorithmKind::SlidingWindowCounter,
        }
    }

    /// Stable identifier for display and config round-trips.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

pub(crate) fn duration_from_nanos(nanos: u128) -> Duration {
    Duration::new((nanos / NANOS_PER_SEC) as u64, (nanos % NANOS_PER_SEC) as u32)
}

/// Start of the epoch-aligned window of length `window` containing `now`.
pub(crate) fn align_to_window(now: Duration, window: Duration) -> Duration {
    let w = window.as_nanos();
    duration_from_nanos((now.as_nanos() / w) * w)
}
