//! The error taxonomy of the registry boundary.
//!
//! Every variant is a local, recoverable condition surfaced to the
//! immediate caller; none is fatal to the process. A clock reading that
//! steps backward is deliberately *not* an error: the algorithms clamp it
//! to "no time elapsed" instead, since wall clocks do occasionally regress.

use thiserror::Error;

/// Errors returned by [`RateLimiterRegistry`](crate::RateLimiterRegistry)
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The configuration handed to `register` cannot describe a working
    /// limiter. Raised at registration time, never during `allow`.
    #[error("invalid rate limit config: {reason}")]
    InvalidConfig { reason: &'static str },

    /// The operation named a client id that was never registered (or has
    /// been unregistered). Recoverable by calling `register` first;
    /// limiters are never created implicitly, so a configuration cannot be
    /// accidentally inferred.
    #[error("client {client_id:?} is not registered")]
    ClientNotFound { client_id: String },
}

impl RegistryError {
    pub(crate) fn invalid_config(reason: &'static str) -> Self {
        RegistryError::InvalidConfig { reason }
    }

    pub(crate) fn client_not_found(client_id: &str) -> Self {
        RegistryError::ClientNotFound {
            client_id: client_id.to_owned(),
        }
    }
}
