//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render site chrome and shared widgets while reading the session
//! signal from Leptos context. Pages compose them and own data fetching.

pub mod article_list;
pub mod confirm_dialog;
pub mod content_box;
pub mod guarded;
pub mod loading;
pub mod navbar;
