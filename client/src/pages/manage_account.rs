//! Account settings for the signed-in user.
//!
//! Only fields that differ from the current session user are sent. After the
//! backend accepts the change the session user is patched locally so the
//! navbar and dashboard reflect it without a reload.

use leptos::prelude::*;
use session::{Requirement, SessionUserPatch};

use crate::components::guarded::Guarded;
use crate::net::types::AccountUpdate;
use crate::state::auth::AuthSignal;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Notice {
    Success(String),
    Error(String),
}

/// Local patch mirroring an accepted account update.
fn session_patch(update: &AccountUpdate) -> SessionUserPatch {
    SessionUserPatch { username: update.username.clone(), email: update.email.clone(), ..SessionUserPatch::default() }
}

#[component]
pub fn ManageAccountPage() -> impl IntoView {
    view! {
        <Guarded requirement=Requirement::Authenticated>
            <AccountForm/>
        </Guarded>
    }
}

#[component]
fn AccountForm() -> impl IntoView {
    let auth = expect_context::<AuthSignal>();
    let current = auth.get_untracked().user;
    let username = RwSignal::new(current.as_ref().map(|u| u.username.clone()).unwrap_or_default());
    let email = RwSignal::new(current.as_ref().map(|u| u.email.clone()).unwrap_or_default());
    let password = RwSignal::new(String::new());
    let notice = RwSignal::new(None::<Notice>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let Some(user) = auth.get_untracked().user else {
            return;
        };
        let update = AccountUpdate::from_form(&user.username, &user.email, &username.get(), &email.get(), &password.get());
        if update.is_empty() {
            notice.set(Some(Notice::Error("Nothing to update.".to_owned())));
            return;
        }
        busy.set(true);
        notice.set(None);

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::update_account(&update).await {
                Ok(()) => {
                    crate::state::auth::update_user(session_patch(&update));
                    password.set(String::new());
                    notice.set(Some(Notice::Success("Account updated.".to_owned())));
                }
                Err(e) => notice.set(Some(Notice::Error(e))),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = session_patch(&update);
            busy.set(false);
        }
    };

    view! {
        <div class="page manage-account-page">
            <div class="form-card">
                <h1 class="page__title">"Manage Account"</h1>
                <p class="page__subtitle">"Update your personal preferences and settings."</p>
                {move || {
                    notice
                        .get()
                        .map(|n| match n {
                            Notice::Success(text) => view! { <p class="notice notice--success">{text}</p> }.into_any(),
                            Notice::Error(text) => view! { <p class="notice notice--error">{text}</p> }.into_any(),
                        })
                }}
                <form class="account-form" on:submit=on_submit>
                    <label class="form-label" for="account-username">"Username"</label>
                    <input
                        id="account-username"
                        class="form-input"
                        type="text"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                    />
                    <label class="form-label" for="account-email">"Email Address"</label>
                    <input
                        id="account-email"
                        class="form-input"
                        type="email"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <label class="form-label" for="account-password">"New Password"</label>
                    <input
                        id="account-password"
                        class="form-input"
                        type="password"
                        autocomplete="new-password"
                        placeholder="Leave blank to keep current password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="btn btn--primary" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Saving..." } else { "Save Changes" }}
                    </button>
                </form>
            </div>
        </div>
    }
}
