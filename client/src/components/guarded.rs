//! Page wrapper applying a view guard.
//!
//! Children are only built once the guard allows them, so pages can start
//! their data fetches unconditionally when they mount.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use session::{GuardOutcome, Requirement};

use crate::components::loading::LoadingIndicator;
use crate::state::auth::AuthSignal;
use crate::util::auth::install_guard;

#[component]
pub fn Guarded(requirement: Requirement, children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<AuthSignal>();
    let outcome = install_guard(auth, requirement, use_navigate());

    move || match outcome.get() {
        GuardOutcome::Loading => view! { <LoadingIndicator/> }.into_any(),
        GuardOutcome::RedirectToSignIn => view! { <LoadingIndicator label="Redirecting to sign in..."/> }.into_any(),
        GuardOutcome::AccessDenied => view! { <AccessDenied/> }.into_any(),
        GuardOutcome::Allowed => children().into_any(),
    }
}

/// Shown to signed-in users whose role is not on the page's allow-list.
#[component]
pub fn AccessDenied() -> impl IntoView {
    view! {
        <div class="access-denied">
            <h1 class="access-denied__title">"Access Denied"</h1>
            <p class="access-denied__text">"You do not have permission to view this page."</p>
            <a class="btn btn--primary" href="/dashboard">"Return to Dashboard"</a>
        </div>
    }
}
