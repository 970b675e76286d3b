//! The caller's own submissions with their review status.

use leptos::prelude::*;
use session::Requirement;

use super::{ArticleScope, article_grid, refresh_articles};
use crate::components::guarded::Guarded;
use crate::state::articles::ArticlesState;

#[component]
pub fn MyArticlesPage() -> impl IntoView {
    view! {
        <Guarded requirement=Requirement::Authenticated>
            <MyArticlesList/>
        </Guarded>
    }
}

#[component]
fn MyArticlesList() -> impl IntoView {
    let list = RwSignal::new(ArticlesState::loading());
    refresh_articles(list, ArticleScope::Mine);

    view! {
        <div class="page my-articles-page">
            <header class="page__header">
                <h1 class="page__title">"My Articles"</h1>
                <a class="btn btn--primary" href="/upload">"Upload Article"</a>
            </header>
            {article_grid(list, true, |state| state.items.clone())}
        </div>
    }
}
