//! Browser `localStorage` access.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session cache, the hosted access token and the theme preference all
//! live in `localStorage`. These helpers centralize the hydrate-only web-sys
//! glue; on the server every read is empty and every write is a no-op.

use session::{SessionCache, SessionError};

/// Read the raw string stored under `key`.
///
/// # Errors
///
/// Returns an error string if storage is unavailable or the read throws.
pub fn load_raw(key: &str) -> Result<Option<String>, String> {
    #[cfg(feature = "hydrate")]
    {
        local_storage()?.get_item(key).map_err(|e| format!("{e:?}"))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = key;
        Ok(None)
    }
}

/// Store `value` under `key`.
///
/// # Errors
///
/// Returns an error string if storage is unavailable or full.
pub fn save_raw(key: &str, value: &str) -> Result<(), String> {
    #[cfg(feature = "hydrate")]
    {
        local_storage()?.set_item(key, value).map_err(|e| format!("{e:?}"))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (key, value);
        Ok(())
    }
}

/// Remove `key`.
///
/// # Errors
///
/// Returns an error string if storage is unavailable.
pub fn remove(key: &str) -> Result<(), String> {
    #[cfg(feature = "hydrate")]
    {
        local_storage()?.remove_item(key).map_err(|e| format!("{e:?}"))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = key;
        Ok(())
    }
}

#[cfg(feature = "hydrate")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| "localStorage unavailable".to_owned())
}

/// [`SessionCache`] backed by one `localStorage` key.
#[derive(Clone, Debug)]
pub struct LocalStorageCache {
    key: String,
}

impl LocalStorageCache {
    pub fn new(key: &str) -> Self {
        Self { key: key.to_owned() }
    }
}

impl SessionCache for LocalStorageCache {
    fn load(&self) -> Result<Option<String>, SessionError> {
        load_raw(&self.key).map_err(SessionError::Storage)
    }

    fn store(&self, raw: &str) -> Result<(), SessionError> {
        save_raw(&self.key, raw).map_err(SessionError::Storage)
    }

    fn clear(&self) -> Result<(), SessionError> {
        remove(&self.key).map_err(SessionError::Storage)
    }
}
