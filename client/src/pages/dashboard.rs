//! Member dashboard: greeting, shortcuts and sign-out.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the authenticated landing route after sign-in. Shortcut cards are
//! filtered by role; the moderation and administration pages repeat the check
//! through their own guards.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use leptos::prelude::*;
use session::guard::{ADMIN_ONLY, MODERATORS};
use session::{Requirement, Role};

use crate::components::guarded::Guarded;
use crate::state::auth::AuthSignal;

/// A dashboard shortcut card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Shortcut {
    pub href: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

const MEMBER_SHORTCUTS: [Shortcut; 3] = [
    Shortcut { href: "/upload", label: "Upload Article", description: "Submit a new draft for review." },
    Shortcut { href: "/my-articles", label: "My Articles", description: "Track the status of your submissions." },
    Shortcut { href: "/manage-account", label: "Manage Account", description: "Update your username, email or password." },
];

const MODERATOR_SHORTCUTS: [Shortcut; 1] =
    [Shortcut { href: "/manage-articles", label: "Manage Articles", description: "Review, publish or remove articles." }];

const ADMIN_SHORTCUTS: [Shortcut; 2] = [
    Shortcut { href: "/manage-users", label: "Manage Users", description: "Change member roles." },
    Shortcut { href: "/invite", label: "Invite User", description: "Create an account for a new member." },
];

/// Shortcuts visible to `role`.
pub(crate) fn shortcuts_for(role: Role) -> Vec<Shortcut> {
    let mut out = MEMBER_SHORTCUTS.to_vec();
    if MODERATORS.contains(&role) {
        out.extend(MODERATOR_SHORTCUTS);
    }
    if ADMIN_ONLY.contains(&role) {
        out.extend(ADMIN_SHORTCUTS);
    }
    out
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    view! {
        <Guarded requirement=Requirement::Authenticated>
            <DashboardBody/>
        </Guarded>
    }
}

#[component]
fn DashboardBody() -> impl IntoView {
    let auth = expect_context::<AuthSignal>();
    let signing_out = RwSignal::new(false);

    let on_sign_out = move |_| {
        if signing_out.get() {
            return;
        }
        signing_out.set(true);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let route = crate::state::auth::logout().await;
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href(&route);
            }
        });
    };

    move || {
        let Some(user) = auth.get().user else {
            return ().into_any();
        };
        let cards = shortcuts_for(user.role);
        view! {
            <div class="page dashboard-page">
                <header class="dashboard-page__header">
                    <div>
                        <h1 class="page__title">{format!("Welcome, {}", user.name)}</h1>
                        <p class="page__subtitle">{format!("Signed in as {} ({})", user.email, user.role.label())}</p>
                    </div>
                    <button class="btn" on:click=on_sign_out disabled=move || signing_out.get()>
                        {move || if signing_out.get() { "Signing out..." } else { "Sign Out" }}
                    </button>
                </header>
                <div class="dashboard-grid">
                    {cards
                        .into_iter()
                        .map(|card| {
                            view! {
                                <a class="dashboard-card" href=card.href>
                                    <h3 class="dashboard-card__title">{card.label}</h3>
                                    <p class="dashboard-card__text">{card.description}</p>
                                </a>
                            }
                        })
                        .collect_view()}
                </div>
            </div>
        }
        .into_any()
    }
}
