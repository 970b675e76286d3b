//! Client-side reactive state modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` bridges the session store into a Leptos signal provided at the app
//! root; `articles` and `users` hold page-scoped list state with the pure
//! update rules the moderation pages rely on.

pub mod articles;
pub mod auth;
pub mod users;
