//! Published research listing.

use leptos::prelude::*;

use super::{ArticleScope, article_grid, refresh_articles};
use crate::state::articles::{ArticlesState, public_articles};

#[component]
pub fn ResearchPage() -> impl IntoView {
    let list = RwSignal::new(ArticlesState::loading());
    refresh_articles(list, ArticleScope::All);

    view! {
        <div class="page research-page">
            <h1 class="page__title">"Research"</h1>
            <p class="page__subtitle">"Articles written by our members and approved for publication."</p>
            {article_grid(list, false, |state| public_articles(&state.items))}
        </div>
    }
}
