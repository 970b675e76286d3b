//! Published session state.

use crate::role::Role;
use crate::user::SessionUser;

/// What the UI sees: the merged user (if any) and whether the first
/// resolution is still running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<SessionUser>,
    pub is_loading: bool,
}

impl Default for SessionState {
    /// Mount-time state: loading, nobody known yet.
    fn default() -> Self {
        Self { user: None, is_loading: true }
    }
}

impl SessionState {
    /// Role of the signed-in user.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    /// True once loading finished with a user present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.is_loading && self.user.is_some()
    }
}

/// Lifecycle phase of a [`crate::SessionStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// `initialize()` has not run.
    Uninitialized,
    /// Initial resolution in progress.
    Loading,
    /// Resolved, nobody signed in.
    Anonymous,
    /// A `login()` call is in flight.
    LoginPending,
    /// Resolved with a user.
    Authenticated,
}
