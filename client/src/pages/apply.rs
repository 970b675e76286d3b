//! Membership application page embedding the interest form.

use leptos::prelude::*;

const INTEREST_FORM_URL: &str =
    "https://docs.google.com/forms/d/e/1FAIpQLSc2WXn8amuc_HxTa_1k9vk_9ylMR702zqmVdSiL3M_gkTpX-A/viewform?embedded=true";

#[component]
pub fn ApplyPage() -> impl IntoView {
    view! {
        <div class="page apply-page">
            <h1 class="page__title">"Apply"</h1>
            <p class="page__subtitle">
                "Interested in joining? Fill out the form below and an officer will reach out."
            </p>
            <iframe class="apply-page__form" src=INTEREST_FORM_URL title="Interest form" {..leptos::tachys::html::attribute::loading("lazy")}></iframe>
        </div>
    }
}
