//! Moderation table for every article.
//!
//! DESIGN
//! ======
//! Status changes apply to the local row first and are reverted by a full
//! refetch when the request fails. Deleting asks for confirmation and only
//! removes the row after the backend accepted it.

use leptos::prelude::*;
use session::{MODERATORS, Requirement};

use super::{ArticleScope, refresh_articles};
use crate::components::confirm_dialog::ConfirmDialog;
use crate::components::guarded::Guarded;
use crate::components::loading::LoadingIndicator;
use crate::net::types::{Article, ArticleStatus};
use crate::state::articles::ArticlesState;

#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingDelete {
    id: i64,
    title: String,
}

#[component]
pub fn ManageArticlesPage() -> impl IntoView {
    view! {
        <Guarded requirement=Requirement::AnyOf(MODERATORS)>
            <ModerationTable/>
        </Guarded>
    }
}

#[component]
fn ModerationTable() -> impl IntoView {
    let list = RwSignal::new(ArticlesState::loading());
    let action_error = RwSignal::new(None::<String>);
    let pending_delete = RwSignal::new(None::<PendingDelete>);
    let deleting = RwSignal::new(false);
    refresh_articles(list, ArticleScope::All);

    let change_status = move |id: i64, status: ArticleStatus| {
        if list.try_update(|s| s.set_status(id, status)).flatten() == Some(status) {
            return;
        }
        action_error.set(None);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            if let Err(e) = crate::net::api::update_article_status(id, status).await {
                action_error.set(Some(e));
                refresh_articles(list, ArticleScope::All);
            }
        });
    };

    let confirm_delete = Callback::new(move |()| {
        let Some(target) = pending_delete.get_untracked() else {
            return;
        };
        deleting.set(true);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::delete_article(target.id).await {
                Ok(()) => {
                    list.update(|s| {
                        s.remove(target.id);
                    });
                }
                Err(e) => action_error.set(Some(e)),
            }
            deleting.set(false);
            pending_delete.set(None);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = target;
            deleting.set(false);
            pending_delete.set(None);
        }
    });
    let cancel_delete = Callback::new(move |()| pending_delete.set(None));
    let delete_message = Signal::derive(move || {
        pending_delete
            .get()
            .map(|p| format!("Delete \"{}\"? This cannot be undone.", p.title))
            .unwrap_or_default()
    });

    let row = move |article: Article| {
        let id = article.id;
        let title = article.title.clone();
        let date = article.published_day().unwrap_or("-").to_owned();
        let current = article.status;
        view! {
            <tr>
                <td><a href=format!("/article/{id}")>{article.title}</a></td>
                <td>{article.author}</td>
                <td>{date}</td>
                <td>
                    <select
                        class="form-select"
                        on:change=move |ev| change_status(id, ArticleStatus::parse(&event_target_value(&ev)))
                    >
                        {status_choices(current)
                            .into_iter()
                            .map(|choice| {
                                view! {
                                    <option value=choice.as_str() selected={choice == current}>
                                        {choice.label()}
                                    </option>
                                }
                            })
                            .collect_view()}
                    </select>
                </td>
                <td>
                    <button
                        class="btn btn--danger btn--small"
                        on:click=move |_| pending_delete.set(Some(PendingDelete { id, title: title.clone() }))
                    >
                        "Delete"
                    </button>
                </td>
            </tr>
        }
    };

    view! {
        <div class="page manage-articles-page">
            <h1 class="page__title">"Manage Articles"</h1>
            <Show when=move || action_error.get().is_some()>
                <p class="notice notice--error">{move || action_error.get().unwrap_or_default()}</p>
            </Show>
            <Show
                when=move || !list.with(|s| s.loading)
                fallback=|| view! { <LoadingIndicator label="Loading articles..."/> }
            >
                <Show when=move || list.with(|s| s.error.is_some())>
                    <p class="page__error">{move || list.with(|s| s.error.clone().unwrap_or_default())}</p>
                </Show>
                <table class="data-table">
                    <thead>
                        <tr>
                            <th>"Title"</th>
                            <th>"Author"</th>
                            <th>"Date"</th>
                            <th>"Status"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || list.get().items
                            key=|article| (article.id, article.status)
                            children=row
                        />
                    </tbody>
                </table>
            </Show>
            <Show when=move || pending_delete.get().is_some()>
                <ConfirmDialog
                    title="Delete article"
                    message=delete_message
                    confirm_label="Delete"
                    busy=deleting.into()
                    on_confirm=confirm_delete
                    on_cancel=cancel_delete
                />
            </Show>
        </div>
    }
}

/// Options offered in a row's status select: the moderation choices plus the
/// row's current status when it is not one of them.
fn status_choices(current: ArticleStatus) -> Vec<ArticleStatus> {
    let mut choices = ArticleStatus::MODERATION_CHOICES.to_vec();
    if !choices.contains(&current) {
        choices.insert(0, current);
    }
    choices
}
