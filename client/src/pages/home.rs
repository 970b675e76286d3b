//! Landing page: club blurb and the latest public articles.

use leptos::prelude::*;

use super::{ArticleScope, article_grid, refresh_articles};
use crate::state::articles::{ArticlesState, public_articles};

const LATEST_COUNT: usize = 3;

#[component]
pub fn HomePage() -> impl IntoView {
    let list = RwSignal::new(ArticlesState::loading());
    refresh_articles(list, ArticleScope::All);

    view! {
        <div class="page home-page">
            <section class="hero">
                <h1 class="hero__title">"SAGE"</h1>
                <p class="hero__blurb">
                    "A student organization for research, writing and discussion. Members publish "
                    "articles reviewed by our officers; everyone is welcome to read."
                </p>
                <div class="hero__actions">
                    <a class="btn btn--primary" href="/research">"Read our research"</a>
                    <a class="btn" href="/apply">"Join us"</a>
                </div>
            </section>
            <section class="page__section">
                <h2>"Latest Articles"</h2>
                {article_grid(list, false, latest)}
            </section>
        </div>
    }
}

fn latest(state: &ArticlesState) -> Vec<crate::net::types::Article> {
    let mut articles = public_articles(&state.items);
    articles.truncate(LATEST_COUNT);
    articles
}
