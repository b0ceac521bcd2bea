//! Per-client rate limit configuration.

use std::fmt;
use std::time::Duration;

use crate::errors::RegistryError;

/// The closed set of admission disciplines a client can be registered with.
///
/// The variant determines both the admission rule and the shape of the
/// per-client state; switching a client to a different variant via
/// re-registration discards its previous state entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmKind {
    /// Bursts up to capacity, continuous lazy refill.
    TokenBucket,
    /// Queue drained at a constant rate; smooths bursts instead of
    /// permitting them.
    LeakyBucket,
    /// Counter reset at epoch-aligned boundaries.
    FixedWindow,
    /// Exact trailing-window history of admitted timestamps.
    SlidingWindowLog,
    /// Two-bucket linear-interpolation approximation of the log.
    SlidingWindowCounter,
}

impl AlgorithmKind {
    /// All variants, in a stable order.
    pub const ALL: [AlgorithmKind; 5] = [
        AlgorithmKind::TokenBucket,
        AlgorithmKind::LeakyBucket,
        AlgorithmKind::FixedWindow,
        AlgorithmKind::SlidingWindowLog,
        AlgorithmKind::SlidingWindowCounter,
    ];

    /// Stable identifier for display and configuration round-trips.
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::TokenBucket => "token_bucket",
            AlgorithmKind::LeakyBucket => "leaky_bucket",
            AlgorithmKind::FixedWindow => "fixed_window",
            AlgorithmKind::SlidingWindowLog => "sliding_window_log",
            AlgorithmKind::SlidingWindowCounter => "sliding_window_counter",
        }
    }

    /// Parses the identifier produced by [`AlgorithmKind::name`].
    pub fn from_name(name: &str) -> Option<AlgorithmKind> {
        AlgorithmKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable per-client configuration: at most `max_requests` admissions
/// per `window`, enforced under the discipline named by `algorithm`.
///
/// Construction is unchecked; validation happens when the config reaches
/// the registry (or [`Limiter::from_config`](crate::Limiter::from_config)),
/// which rejects `max_requests == 0`, a zero window, and windows shorter
/// than one nanosecond per request (the bucket algorithms derive a
/// per-request interval that would otherwise truncate to zero).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum number of admitted requests per window. Must be at least 1.
    pub max_requests: u32,
    /// Length of the enforcement window. Must be positive.
    pub window: Duration,
    /// The admission discipline to enforce.
    pub algorithm: AlgorithmKind,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration, algorithm: AlgorithmKind) -> Self {
        RateLimitConfig {
            max_requests,
            window,
            algorithm,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), RegistryError> {
        if self.max_requests == 0 {
            return Err(RegistryError::invalid_config("max_requests must be at least 1"));
        }
        if self.window.is_zero() {
            return Err(RegistryError::invalid_config("window must be positive"));
        }
        if self.window.as_nanos() < u128::from(self.max_requests) {
            return Err(RegistryError::invalid_config(
                "window is shorter than one nanosecond per request",
            ));
        }
        Ok(())
    }
}
