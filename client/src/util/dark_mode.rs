//! Theme initialization and toggle.
//!
//! Reads the user's preference from `localStorage` and applies a
//! `data-theme` attribute to the `<html>` element. Toggle writes back to
//! `localStorage` and updates that attribute. Requires a browser environment.
//!
//! TRADE-OFFS
//! ==========
//! Preference persistence is best-effort browser-only behavior; SSR paths
//! no-op to keep server rendering deterministic.

#[cfg(test)]
#[path = "dark_mode_test.rs"]
mod dark_mode_test;

use super::storage;

const STORAGE_KEY: &str = "sage_theme";

/// `data-theme` value for a preference.
pub fn theme_name(dark: bool) -> &'static str {
    if dark { "dark" } else { "light" }
}

/// Parse a stored preference; anything but `dark`/`light` is unset.
pub fn parse_stored(raw: Option<&str>) -> Option<bool> {
    match raw.map(str::trim) {
        Some("dark") => Some(true),
        Some("light") => Some(false),
        _ => None,
    }
}

/// Read the theme preference.
///
/// Returns the stored choice, or the system preference when nothing is
/// stored. Always `false` on the server.
pub fn read_preference() -> bool {
    let stored = storage::load_raw(STORAGE_KEY).ok().flatten();
    if let Some(dark) = parse_stored(stored.as_deref()) {
        return dark;
    }
    #[cfg(feature = "hydrate")]
    {
        web_sys::window()
            .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
            .is_some_and(|mq| mq.matches())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        false
    }
}

/// Apply the `data-theme` attribute on the `<html>` element.
pub fn apply(dark: bool) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(el) = web_sys::window().and_then(|w| w.document()).and_then(|d| d.document_element()) {
            let _ = el.set_attribute("data-theme", theme_name(dark));
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = dark;
    }
}

/// Toggle the theme and persist the new preference.
pub fn toggle(current: bool) -> bool {
    let next = !current;
    apply(next);
    let _ = storage::save_raw(STORAGE_KEY, theme_name(next));
    next
}
