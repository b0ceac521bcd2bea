//! # Keyed, multi-algorithm rate limiting in Rust
//!
//! This crate implements an embeddable admission-control engine: callers
//! register a client identity together with a [`RateLimitConfig`], then ask
//! the [`RateLimiterRegistry`] whether each of that client's requests is
//! admitted or rejected. Five algorithm disciplines are provided and
//! selected per client at registration time:
//!
//! * **Token bucket**: permits bursts up to `max_requests` while enforcing
//!   a long-run average rate; refill is lazy, computed on access.
//! * **Leaky bucket**: models a queue drained at a constant rate; requests
//!   are admitted only while the queue has room, and drained slots free up
//!   one per leak interval rather than in bursts.
//! * **Fixed window**: a counter reset at epoch-aligned boundaries. Cheap,
//!   with the well-known double-admission burst at window boundaries.
//! * **Sliding window log**: exact limiting from a timestamped history of
//!   admitted requests; the reference algorithm, O(window) memory.
//! * **Sliding window counter**: O(1) approximation of the log using two
//!   adjacent window counters and linear interpolation.
//!
//! ## Interface
//!
//! ``` rust
//! use std::time::Duration;
//! use ratelimit_registry::{AlgorithmKind, RateLimitConfig, RateLimiterRegistry};
//!
//! let registry = RateLimiterRegistry::new();
//! registry.register(
//!     "api-key-1",
//!     RateLimitConfig::new(100, Duration::from_secs(60), AlgorithmKind::TokenBucket),
//! )?;
//!
//! let info = registry.allow("api-key-1")?;
//! assert!(info.is_allowed());
//! assert_eq!(info.remaining, 99);
//! # Ok::<(), ratelimit_registry::RegistryError>(())
//! ```
//!
//! The interface is intentionally geared towards only providing callers
//! with the information they need to decide what to do with each request:
//! a [`RateLimitInfo`] carries the decision, the remaining quota, and the
//! earliest time at which capacity will next be available. The crate never
//! waits on the caller's behalf: rejection is immediate, and retrying
//! after [`RateLimitInfo::reset_at`] is the caller's business.
//!
//! ## Time
//!
//! Algorithms never read the wall clock themselves. Time is supplied by a
//! [`Clock`](clock::Clock) owned by the registry (or passed explicitly via
//! the `*_at` methods) as a `Duration` offset from the clock's epoch. This
//! makes window arithmetic deterministic under the test clock
//! ([`ManualClock`](clock::ManualClock)) and keeps fixed-window boundaries
//! aligned across clients.
//!
//! ## Thread-safe operation
//!
//! The registry may be shared freely across threads (typically behind an
//! `Arc`). The client map is sharded, and each client's state sits behind
//! its own lock, so contention on one client never blocks admission
//! decisions for another. Every operation is a bounded, synchronous
//! computation, with no I/O and no suspension.

pub mod algorithms;
pub mod clock;
pub mod config;
pub mod errors;
pub mod registry;

use std::time::Duration;

pub use crate::algorithms::Limiter;
pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::config::{AlgorithmKind, RateLimitConfig};
pub use crate::errors::RegistryError;
pub use crate::registry::RateLimiterRegistry;

/// A decision on a single request from the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The request conforms to the client's configured rate; let it through.
    Allowed,

    /// The request does not conform and should be throttled. The
    /// accompanying [`RateLimitInfo::reset_at`] names the earliest instant
    /// at which capacity becomes available again.
    Rejected,
}

impl Decision {
    /// Returns `true` iff the decision was [`Decision::Allowed`].
    ///
    /// Note: this method is mostly useful in tests.
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// The immutable result value of one admission check.
///
/// Produced fresh per call; purely a return value, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Whether the request was admitted.
    pub decision: Decision,

    /// How many further requests could be admitted right now. Zero on a
    /// rejection.
    pub remaining: u32,

    /// For rejections, the earliest clock reading at which an otherwise
    /// idle client would be admitted again. For admissions, the time at
    /// which the client's quota is fully restored.
    pub reset_at: Duration,

    /// Human-readable explanation of the decision, suitable for logs or
    /// error messages.
    pub reason: &'static str,
}

impl RateLimitInfo {
    pub(crate) fn allowed(remaining: u32, reset_at: Duration, reason: &'static str) -> Self {
        RateLimitInfo {
            decision: Decision::Allowed,
            remaining,
            reset_at,
            reason,
        }
    }

    pub(crate) fn rejected(reset_at: Duration, reason: &'static str) -> Self {
        RateLimitInfo {
            decision: Decision::Rejected,
            remaining: 0,
            reset_at,
            reason,
        }
    }

    /// Returns `true` iff the request was admitted.
    pub fn is_allowed(&self) -> bool {
        self.decision.is_allowed()
    }
}
