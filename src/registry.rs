//! The client → limiter association and the engine's public entry point.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::algorithms::Limiter;
use crate::clock::{Clock, MonotonicClock};
use crate::config::RateLimitConfig;
use crate::errors::RegistryError;
use crate::RateLimitInfo;

/// Owns the mapping from client identity to (config, limiter state) and
/// the clock that drives the algorithms.
///
/// The registry is an explicitly constructed object with no ambient global
/// state; share it across request-handling threads behind an `Arc` (all
/// methods take `&self`). Any process-wide instance is a composition-root
/// decision, not baked into the type.
///
/// # Concurrency
///
/// The client map is sharded ([`DashMap`]), and each entry guards its own
/// limiter with a dedicated lock, taken only after the map shard guard has
/// been released. Contention on one client therefore never blocks
/// decisions for another, and registration churn contends with the map
/// structure, not with per-client decisions.
///
/// # Example
///
/// ``` rust
/// use std::time::Duration;
/// use ratelimit_registry::{
///     AlgorithmKind, ManualClock, RateLimitConfig, RateLimiterRegistry,
/// };
///
/// let clock = ManualClock::new();
/// let registry = RateLimiterRegistry::with_clock(clock.clone());
/// registry.register(
///     "tenant-a",
///     RateLimitConfig::new(1, Duration::from_secs(1), AlgorithmKind::FixedWindow),
/// )?;
///
/// assert!(registry.allow("tenant-a")?.is_allowed());
/// assert!(!registry.allow("tenant-a")?.is_allowed());
/// clock.advance(Duration::from_secs(1));
/// assert!(registry.allow("tenant-a")?.is_allowed());
/// # Ok::<(), ratelimit_registry::RegistryError>(())
/// ```
pub struct RateLimiterRegistry<C: Clock = MonotonicClock> {
    clients: DashMap<String, Arc<ClientEntry>>,
    clock: C,
}

struct ClientEntry {
    config: RateLimitConfig,
    limiter: Mutex<Limiter>,
}

impl RateLimiterRegistry<MonotonicClock> {
    /// A registry driven by the production monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::default())
    }
}

impl Default for RateLimiterRegistry<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RateLimiterRegistry<C> {
    /// A registry driven by an injected time source; pass a
    /// [`ManualClock`](crate::ManualClock) for deterministic tests.
    pub fn with_clock(clock: C) -> Self {
        RateLimiterRegistry {
            clients: DashMap::new(),
            clock,
        }
    }

    /// Registers `client_id` with `config`, validating it first.
    ///
    /// Registering an id that already exists replaces its config *and*
    /// discards its accumulated state wholesale: there is no merging, and
    /// no state is reused across algorithm changes.
    pub fn register(
        &self,
        client_id: impl Into<String>,
        config: RateLimitConfig,
    ) -> Result<(), RegistryError> {
        let client_id = client_id.into();
        let limiter = Limiter::from_config(&config)?;
        debug!(client = %client_id, algorithm = limiter.name(), "registering rate limit client");
        self.clients.insert(
            client_id,
            Arc::new(ClientEntry {
                config,
                limiter: Mutex::new(limiter),
            }),
        );
        Ok(())
    }

    /// Clones the entry out so the map shard guard is dropped before the
    /// per-client lock is taken.
    fn entry(&self, client_id: &str) -> Result<Arc<ClientEntry>, RegistryError> {
        self.clients
            .get(client_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RegistryError::client_not_found(client_id))
    }

    /// Evaluates one request for `client_id` at the registry clock's
    /// current reading. See [`allow_at`](Self::allow_at).
    pub fn allow(&self, client_id: &str) -> Result<RateLimitInfo, RegistryError> {
        self.allow_at(client_id, self.clock.now())
    }

    /// Evaluates one request for `client_id` as of the explicit clock
    /// reading `now`.
    ///
    /// The refill/leak/rollover computation and the admit-or-reject
    /// decision run as one critical section under the client's own lock,
    /// so concurrent calls for the same client serialize and can never
    /// admit beyond the client's capacity. The call never waits for
    /// capacity: a rejection returns immediately, carrying the earliest
    /// retry time in [`RateLimitInfo::reset_at`].
    pub fn allow_at(&self, client_id: &str, now: Duration) -> Result<RateLimitInfo, RegistryError> {
        let entry = self.entry(client_id)?;
        let info = entry.limiter.lock().allow(now);
        Ok(info)
    }

    /// Read-only projection of the quota available to `client_id` at the
    /// registry clock's current reading.
    pub fn remaining_quota(&self, client_id: &str) -> Result<u32, RegistryError> {
        self.remaining_quota_at(client_id, self.clock.now())
    }

    /// Read-only projection of the quota available at `now`; agrees with
    /// what [`allow_at`](Self::allow_at) would observe, without mutating
    /// any state.
    pub fn remaining_quota_at(&self, client_id: &str, now: Duration) -> Result<u32, RegistryError> {
        let entry = self.entry(client_id)?;
        let quota = entry.limiter.lock().remaining_quota(now);
        Ok(quota)
    }

    /// Reinitializes `client_id`'s state to the fully available baseline
    /// for its algorithm (full bucket, empty queue, empty log). Idempotent.
    pub fn reset(&self, client_id: &str) -> Result<(), RegistryError> {
        let entry = self.entry(client_id)?;
        entry.limiter.lock().reset();
        debug!(client = %client_id, "reset rate limit state");
        Ok(())
    }

    /// Removes `client_id` and all of its state; subsequent operations on
    /// the id behave as unknown until it is registered again.
    pub fn unregister(&self, client_id: &str) -> Result<(), RegistryError> {
        match self.clients.remove(client_id) {
            Some(_) => {
                debug!(client = %client_id, "unregistered rate limit client");
                Ok(())
            }
            None => Err(RegistryError::client_not_found(client_id)),
        }
    }

    pub fn is_registered(&self, client_id: &str) -> bool {
        self.clients.contains_key(client_id)
    }

    /// Number of currently registered clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// The config `client_id` was registered with.
    pub fn config(&self, client_id: &str) -> Result<RateLimitConfig, RegistryError> {
        self.entry(client_id).map(|entry| entry.config.clone())
    }
}
