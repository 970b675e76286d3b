//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected pages apply identical guard behavior: the decision comes from
//! `session::guard::evaluate`, and this module turns a redirect decision into
//! navigation. The checks are advisory; the backend authorizes requests.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use session::{GuardOutcome, Requirement, guard};

use crate::state::auth::AuthSignal;

/// Route to navigate to for `outcome`, if any.
pub fn redirect_target(outcome: GuardOutcome) -> Option<&'static str> {
    match outcome {
        GuardOutcome::RedirectToSignIn => Some("/login"),
        GuardOutcome::Loading | GuardOutcome::AccessDenied | GuardOutcome::Allowed => None,
    }
}

/// Track the guard outcome for `requirement` and navigate to `/login`
/// whenever auth has loaded without a user.
pub fn install_guard<F>(auth: AuthSignal, requirement: Requirement, navigate: F) -> Memo<GuardOutcome>
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    let outcome = Memo::new(move |_| guard::evaluate(&auth.get(), requirement));
    Effect::new(move || {
        if let Some(target) = redirect_target(outcome.get()) {
            navigate(target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
    outcome
}
