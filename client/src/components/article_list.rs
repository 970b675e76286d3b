//! Article cards and status badges.

use leptos::prelude::*;

use crate::net::types::{Article, ArticleStatus};

#[component]
pub fn StatusBadge(status: ArticleStatus) -> impl IntoView {
    view! { <span class=status.badge_class()>{status.label()}</span> }
}

/// Card grid linking each article to its page.
#[component]
pub fn ArticleList(articles: Vec<Article>, #[prop(optional)] show_status: bool) -> impl IntoView {
    if articles.is_empty() {
        return view! { <p class="article-list__empty">"No articles yet."</p> }.into_any();
    }
    view! {
        <div class="article-list">
            {articles
                .into_iter()
                .map(|article| {
                    let href = format!("/article/{}", article.id);
                    let date = article.published_day().map(str::to_owned);
                    view! {
                        <a class="article-card" href=href>
                            <h3 class="article-card__title">{article.title}</h3>
                            <p class="article-card__author">{article.author}</p>
                            {date.map(|d| view! { <p class="article-card__date">{d}</p> })}
                            {show_status.then(|| view! { <StatusBadge status=article.status/> })}
                        </a>
                    }
                })
                .collect_view()}
        </div>
    }
    .into_any()
}
