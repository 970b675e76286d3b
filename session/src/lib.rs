//! Client session and authorization synchronizer for the SAGE website.
//!
//! This crate owns the UI-facing view of "who is signed in and what may they
//! see". It mirrors a remote authority (the backend's auth service) into a
//! single [`SessionStore`] and exposes pure guard decisions for pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! The crate is UI-framework agnostic: collaborators (remote session source,
//! role resolver, durable cache, timer) are injected as traits so the Leptos
//! client can plug in browser adapters while tests plug in fakes.
//!
//! TRADE-OFFS
//! ==========
//! Everything here is advisory UI state. The backend must still authorize
//! every privileged request on its own.

pub mod cache;
pub mod error;
pub mod guard;
pub mod role;
pub mod source;
pub mod state;
pub mod store;
pub mod user;

pub use cache::{DEFAULT_CACHE_KEY, MemoryCache, SessionCache, decode_user, encode_user};
pub use error::SessionError;
pub use guard::{ADMIN_ONLY, GuardOutcome, MODERATORS, Requirement};
pub use role::Role;
pub use source::{AuthChange, AuthEvent, AuthListener, ListenerId, Listeners, RoleResolver, SessionSource, Sleeper};
pub use state::{SessionPhase, SessionState};
pub use store::{SessionConfig, SessionStore, SessionStoreBuilder, SessionSubscription};
pub use user::{Principal, PrincipalMetadata, RoleLookup, SessionUser, SessionUserPatch};
