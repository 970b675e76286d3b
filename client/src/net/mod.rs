//! Networking modules for the content API and the two auth backends.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles content requests, `rest_session` and `hosted_session` adapt
//! the backend auth contracts to `session::SessionSource`, and `types` defines
//! the shared wire schema.

pub mod api;
pub mod hosted_session;
pub mod rest_session;
pub mod types;
