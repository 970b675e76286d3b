//! # client
//!
//! Leptos + WASM frontend for the SAGE website: article browsing, draft
//! submission, moderation and account management.
//!
//! Session and authorization state comes from the `session` crate. This crate
//! supplies the browser adapters it needs (backend session sources, the
//! `localStorage` cache, a timer) and renders pages that react to the
//! published [`session::SessionState`].

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install logging and hydrate the server-rendered body.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
