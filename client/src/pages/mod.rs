//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (fetches, optimistic edits,
//! dialogs) and delegates rendering details to `components`. Protected pages
//! wrap their body in `components::guarded::Guarded`.

pub mod apply;
pub mod article;
pub mod dashboard;
pub mod home;
pub mod invite;
pub mod login;
pub mod manage_account;
pub mod manage_articles;
pub mod manage_users;
pub mod my_articles;
pub mod research;
pub mod team;
pub mod upload;

use leptos::prelude::*;

use crate::components::article_list::ArticleList;
use crate::components::loading::LoadingIndicator;
use crate::state::articles::ArticlesState;

/// Which article listing a page shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ArticleScope {
    /// Everything the backend returns for `GET /api/articles`.
    All,
    /// The caller's own submissions.
    Mine,
}

/// Fetch the list for `scope` into `list`.
pub(crate) fn refresh_articles(list: RwSignal<ArticlesState>, scope: ArticleScope) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        let result = match scope {
            ArticleScope::All => crate::net::api::fetch_articles().await,
            ArticleScope::Mine => crate::net::api::fetch_my_articles().await,
        };
        if let Err(e) = &result {
            log::warn!("article fetch failed: {e}");
        }
        list.update(|s| s.finish(result));
    });
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (list, scope);
    }
}

/// Loading, error or card grid for a fetched list. `select` picks the
/// articles to show from the fetched items.
pub(crate) fn article_grid(
    list: RwSignal<ArticlesState>,
    show_status: bool,
    select: fn(&ArticlesState) -> Vec<crate::net::types::Article>,
) -> impl IntoView {
    move || {
        let state = list.get();
        if state.loading {
            return view! { <LoadingIndicator label="Loading articles..."/> }.into_any();
        }
        if let Some(error) = state.error {
            return view! { <p class="page__error">{error}</p> }.into_any();
        }
        view! { <ArticleList articles=select(&state) show_status=show_status/> }.into_any()
    }
}
