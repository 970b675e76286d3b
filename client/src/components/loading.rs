//! Neutral loading indicator.

use leptos::prelude::*;

#[component]
pub fn LoadingIndicator(#[prop(optional, into)] label: Option<String>) -> impl IntoView {
    view! {
        <div class="loading" role="status" aria-live="polite">
            <div class="loading__spinner" aria-hidden="true"></div>
            <span class="loading__label">{label.unwrap_or_else(|| "Loading...".to_owned())}</span>
        </div>
    }
}
