//! Role administration for every profile.
//!
//! Picking a new role in a row opens a confirmation dialog. Confirming applies
//! the change locally, sends it, and refetches the table if the backend
//! refuses. Cancelling rebuilds the rows so the select shows the stored role.

use leptos::prelude::*;
use session::{ADMIN_ONLY, Requirement, Role};

use crate::components::confirm_dialog::ConfirmDialog;
use crate::components::guarded::Guarded;
use crate::components::loading::LoadingIndicator;
use crate::net::types::Profile;
use crate::state::users::{PendingRoleChange, ProfilesState};

#[component]
pub fn ManageUsersPage() -> impl IntoView {
    view! {
        <Guarded requirement=Requirement::AnyOf(ADMIN_ONLY)>
            <ProfilesTable/>
        </Guarded>
    }
}

fn refresh_profiles(list: RwSignal<ProfilesState>) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        let result = crate::net::api::fetch_profiles().await;
        list.update(|s| s.finish(result));
    });
    #[cfg(not(feature = "hydrate"))]
    let _ = list;
}

#[component]
fn ProfilesTable() -> impl IntoView {
    let list = RwSignal::new(ProfilesState::loading());
    let pending = RwSignal::new(None::<PendingRoleChange>);
    let action_error = RwSignal::new(None::<String>);
    // Bumped on cancel so keyed rows are rebuilt with their stored role.
    let generation = RwSignal::new(0_u32);
    refresh_profiles(list);

    let confirm = Callback::new(move |()| {
        let Some(change) = pending.get_untracked() else {
            return;
        };
        pending.set(None);
        action_error.set(None);
        list.update(|s| {
            s.set_role(&change.profile_id, change.to);
        });
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            if let Err(e) = crate::net::api::update_profile_role(&change.profile_id, change.to).await {
                action_error.set(Some(e));
                refresh_profiles(list);
            }
        });
    });
    let cancel = Callback::new(move |()| {
        pending.set(None);
        generation.update(|g| *g = g.wrapping_add(1));
    });
    let prompt = Signal::derive(move || pending.get().map(|p| p.prompt()).unwrap_or_default());

    let row = move |(_, profile): (u32, Profile)| {
        let current = profile.role;
        let joined = profile
            .created_at
            .as_deref()
            .and_then(|raw| raw.split('T').next())
            .unwrap_or("-")
            .to_owned();
        let grad_year = profile.grad_year.map_or_else(|| "-".to_owned(), |y| y.to_string());
        let initial = profile.initial();
        let name = profile.display_name().to_owned();
        view! {
            <tr>
                <td><span class="avatar">{initial}</span></td>
                <td>{name}</td>
                <td>{grad_year}</td>
                <td>
                    <select
                        class="form-select"
                        on:change=move |ev| {
                            let Some(role) = Role::parse(&event_target_value(&ev)) else {
                                return;
                            };
                            pending.set(PendingRoleChange::new(&profile, role));
                        }
                    >
                        {Role::ALL
                            .into_iter()
                            .map(|role| {
                                view! {
                                    <option value=role.as_str() selected={role == current}>{role.label()}</option>
                                }
                            })
                            .collect_view()}
                    </select>
                </td>
                <td>{joined}</td>
            </tr>
        }
    };

    view! {
        <div class="page manage-users-page">
            <h1 class="page__title">"Manage Users"</h1>
            <Show when=move || action_error.get().is_some()>
                <p class="notice notice--error">{move || action_error.get().unwrap_or_default()}</p>
            </Show>
            <Show
                when=move || !list.with(|s| s.loading)
                fallback=|| view! { <LoadingIndicator label="Loading users..."/> }
            >
                <Show when=move || list.with(|s| s.error.is_some())>
                    <p class="page__error">{move || list.with(|s| s.error.clone().unwrap_or_default())}</p>
                </Show>
                <table class="data-table">
                    <thead>
                        <tr>
                            <th></th>
                            <th>"Name"</th>
                            <th>"Grad Year"</th>
                            <th>"Role"</th>
                            <th>"Joined"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || {
                                let generation = generation.get();
                                list.get().items.into_iter().map(move |p| (generation, p)).collect::<Vec<_>>()
                            }
                            key=|(generation, profile)| (*generation, profile.id.clone(), profile.role)
                            children=row
                        />
                    </tbody>
                </table>
            </Show>
            <Show when=move || pending.get().is_some()>
                <ConfirmDialog
                    title="Change role"
                    message=prompt
                    confirm_label="Confirm"
                    busy=Signal::stored(false)
                    on_confirm=confirm
                    on_cancel=cancel
                />
            </Show>
        </div>
    }
}
