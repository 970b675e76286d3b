//! Single article view.
//!
//! Public articles render for everyone. Anything else needs a signed-in
//! viewer; anonymous visitors get a sign-in prompt instead of the body.

#[cfg(test)]
#[path = "article_test.rs"]
mod article_test;

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::components::article_list::StatusBadge;
use crate::components::loading::LoadingIndicator;
use crate::net::types::Article;
use crate::state::articles::can_view;
use crate::state::auth::AuthSignal;
use crate::util::markdown;

#[derive(Clone, Debug, PartialEq)]
enum ArticleLoad {
    Loading,
    NotFound,
    Failed(String),
    Loaded(Article),
}

/// Parse the `:id` route segment.
fn parse_article_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

#[component]
pub fn ArticlePage() -> impl IntoView {
    let auth = expect_context::<AuthSignal>();
    let params = use_params_map();
    let load = RwSignal::new(ArticleLoad::Loading);

    Effect::new(move || {
        let Some(id) = params.with(|p| p.get("id")).and_then(|raw| parse_article_id(&raw)) else {
            load.set(ArticleLoad::NotFound);
            return;
        };
        load.set(ArticleLoad::Loading);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let next = match crate::net::api::fetch_article(id).await {
                Ok(Some(article)) => ArticleLoad::Loaded(article),
                Ok(None) => ArticleLoad::NotFound,
                Err(e) => ArticleLoad::Failed(e),
            };
            load.set(next);
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = id;
    });

    move || match load.get() {
        ArticleLoad::Loading => view! { <LoadingIndicator label="Loading article..."/> }.into_any(),
        ArticleLoad::NotFound => view! {
            <div class="page article-page article-page--missing">
                <h1 class="page__title">"Article not found"</h1>
                <p>"This article does not exist or has been removed."</p>
                <a class="btn btn--primary" href="/">"Back to home"</a>
            </div>
        }
        .into_any(),
        ArticleLoad::Failed(error) => view! {
            <div class="page article-page">
                <p class="page__error">{error}</p>
                <a class="btn" href="/">"Back to home"</a>
            </div>
        }
        .into_any(),
        ArticleLoad::Loaded(article) => {
            let session = auth.get();
            if !article.status.is_public() && session.is_loading {
                return view! { <LoadingIndicator/> }.into_any();
            }
            if !can_view(&article, session.user.is_some()) {
                return view! {
                    <div class="page article-page article-page--locked">
                        <h1 class="page__title">{article.title}</h1>
                        <p>"Sign in to view this article."</p>
                        <a class="btn btn--primary" href="/login">"Sign In"</a>
                    </div>
                }
                .into_any();
            }
            let draft = !article.status.is_public();
            let date = article.published_day().map(str::to_owned);
            view! {
                <article class="page article-page">
                    <header class="article-page__header">
                        <h1 class="page__title">{article.title}</h1>
                        <p class="article-page__meta">
                            <span class="article-page__author">{article.author}</span>
                            {date.map(|d| view! { <span class="article-page__date">{d}</span> })}
                            {draft.then(|| view! { <StatusBadge status=article.status/> })}
                        </p>
                    </header>
                    <div class="article-page__body" inner_html=markdown::sanitize_html(&article.content)></div>
                </article>
            }
            .into_any()
        }
    }
}
