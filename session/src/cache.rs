//! Durable cache of the last published `SessionUser`.
//!
//! The cache holds one JSON-serialized [`SessionUser`] under a single key. It
//! lets the UI paint a signed-in shell before the remote check returns; it is
//! never trusted beyond that first paint.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::cell::RefCell;

use crate::error::SessionError;
use crate::user::SessionUser;

/// Storage key used by browser caches.
pub const DEFAULT_CACHE_KEY: &str = "sage_user";

/// Single-slot string storage.
pub trait SessionCache {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn store(&self, raw: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Serialize a user for the cache.
///
/// # Errors
///
/// Returns [`SessionError::Decode`] if serialization fails.
pub fn encode_user(user: &SessionUser) -> Result<String, SessionError> {
    serde_json::to_string(user).map_err(|e| SessionError::Decode(e.to_string()))
}

/// Parse a cached user.
///
/// # Errors
///
/// Returns [`SessionError::Decode`] for invalid JSON, missing fields or a
/// blank id.
pub fn decode_user(raw: &str) -> Result<SessionUser, SessionError> {
    let user: SessionUser = serde_json::from_str(raw).map_err(|e| SessionError::Decode(e.to_string()))?;
    if user.id.trim().is_empty() {
        return Err(SessionError::Decode("cached user has an empty id".to_owned()));
    }
    Ok(user)
}

/// In-memory cache for tests and server-side rendering.
#[derive(Debug, Default)]
pub struct MemoryCache {
    slot: RefCell<Option<String>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-seeded with `raw`.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { slot: RefCell::new(Some(raw.into())) }
    }

    /// Current raw contents.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl SessionCache for MemoryCache {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.slot.borrow().clone())
    }

    fn store(&self, raw: &str) -> Result<(), SessionError> {
        *self.slot.borrow_mut() = Some(raw.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}
