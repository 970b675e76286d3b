//! Admin-only account creation for new members.

#[cfg(test)]
#[path = "invite_test.rs"]
mod invite_test;

use leptos::prelude::*;
use session::{ADMIN_ONLY, Requirement, Role};

use crate::components::guarded::Guarded;
use crate::net::types::RegisterRequest;

/// Build the registration request from the form, trimming text fields.
///
/// # Errors
///
/// Returns a message when a required field is empty.
pub(crate) fn validate_invite(username: &str, email: &str, password: &str, role: Role) -> Result<RegisterRequest, String> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err("Username, email and password are required.".to_owned());
    }
    if !email.contains('@') {
        return Err("Enter a valid email address.".to_owned());
    }
    Ok(RegisterRequest { username: username.to_owned(), email: email.to_owned(), password: password.to_owned(), role })
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Notice {
    Success(String),
    Error(String),
}

#[component]
pub fn InvitePage() -> impl IntoView {
    view! {
        <Guarded requirement=Requirement::AnyOf(ADMIN_ONLY)>
            <InviteForm/>
        </Guarded>
    }
}

#[component]
fn InviteForm() -> impl IntoView {
    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let role = RwSignal::new(Role::User);
    let notice = RwSignal::new(None::<Notice>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let request = match validate_invite(&username.get(), &email.get(), &password.get(), role.get()) {
            Ok(request) => request,
            Err(message) => {
                notice.set(Some(Notice::Error(message)));
                return;
            }
        };
        busy.set(true);
        notice.set(None);

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::register_user(&request).await {
                Ok(()) => {
                    username.set(String::new());
                    email.set(String::new());
                    password.set(String::new());
                    role.set(Role::User);
                    notice.set(Some(Notice::Success("User invited/created successfully!".to_owned())));
                }
                Err(e) => notice.set(Some(Notice::Error(e))),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = request;
            busy.set(false);
        }
    };

    view! {
        <div class="page invite-page">
            <div class="form-card">
                <h1 class="page__title">"Invite New User"</h1>
                <p class="page__subtitle">"Create an account for a new member."</p>
                {move || {
                    notice
                        .get()
                        .map(|n| match n {
                            Notice::Success(text) => view! { <p class="notice notice--success">{text}</p> }.into_any(),
                            Notice::Error(text) => view! { <p class="notice notice--error">{text}</p> }.into_any(),
                        })
                }}
                <form class="invite-form" on:submit=on_submit>
                    <label class="form-label" for="invite-username">"Username"</label>
                    <input
                        id="invite-username"
                        class="form-input"
                        type="text"
                        placeholder="jdoe"
                        prop:value=move || username.get()
                        on:input=move |ev| username.set(event_target_value(&ev))
                    />
                    <label class="form-label" for="invite-email">"Email Address"</label>
                    <input
                        id="invite-email"
                        class="form-input"
                        type="email"
                        placeholder="jdoe@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <label class="form-label" for="invite-password">"Temporary Password"</label>
                    <input
                        id="invite-password"
                        class="form-input"
                        type="password"
                        autocomplete="new-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <label class="form-label" for="invite-role">"Role"</label>
                    <select
                        id="invite-role"
                        class="form-select"
                        prop:value=move || role.get().as_str()
                        on:change=move |ev| role.set(Role::normalize(Some(event_target_value(&ev).as_str())))
                    >
                        {Role::ALL
                            .into_iter()
                            .map(|r| view! { <option value=r.as_str()>{r.label()}</option> })
                            .collect_view()}
                    </select>
                    <button class="btn btn--primary" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Creating..." } else { "Create User" }}
                    </button>
                </form>
            </div>
        </div>
    }
}
