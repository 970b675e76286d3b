//! Failures reported by session collaborators.
//!
//! None of these escape [`crate::SessionStore`]: the store turns each one into
//! a state transition or a `false` login result and logs the detail.

use std::time::Duration;

/// Error returned by [`crate::SessionSource`], [`crate::RoleResolver`] and
/// [`crate::SessionCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The remote authority could not be reached.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The credential check was rejected.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The remote authority has no valid session for this client.
    #[error("not authenticated")]
    Unauthorized,
    /// A response or cache entry could not be decoded.
    #[error("malformed payload: {0}")]
    Decode(String),
    /// Durable storage was unavailable or refused the write.
    #[error("storage failure: {0}")]
    Storage(String),
    /// The call did not finish within the configured limit.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
