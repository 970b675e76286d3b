//! Page-level access decisions.
//!
//! Every protected page applies the same rule: wait while loading, send
//! anonymous visitors to sign-in, then check the role allow-list. These checks
//! are advisory; the backend must authorize the underlying requests.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::role::Role;
use crate::state::SessionState;

/// Pages only administrators may open.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Pages for anyone who moderates articles.
pub const MODERATORS: &[Role] = &[Role::Admin, Role::Officer];

/// Access requirement declared by a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    AnyOf(&'static [Role]),
}

/// What a page should do for the current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Render a neutral loading indicator; do not navigate.
    Loading,
    /// Navigate to the sign-in page.
    RedirectToSignIn,
    /// Render an access-denied message instead of the content.
    AccessDenied,
    /// Render the protected content.
    Allowed,
}

/// Decide how a page with `requirement` should render for `state`.
#[must_use]
pub fn evaluate(state: &SessionState, requirement: Requirement) -> GuardOutcome {
    if requirement == Requirement::Public {
        return GuardOutcome::Allowed;
    }
    if state.is_loading {
        return GuardOutcome::Loading;
    }
    let Some(user) = state.user.as_ref() else {
        return GuardOutcome::RedirectToSignIn;
    };
    match requirement {
        Requirement::AnyOf(allowed) if !user.has_role(allowed) => GuardOutcome::AccessDenied,
        _ => GuardOutcome::Allowed,
    }
}

/// Convenience for conditional links: is a signed-in user in `allowed`?
#[must_use]
pub fn user_has_any(state: &SessionState, allowed: &[Role]) -> bool {
    state.user.as_ref().is_some_and(|user| user.has_role(allowed))
}
