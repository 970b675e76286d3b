//! Draft submission page.

use leptos::prelude::*;
use session::Requirement;

use crate::components::content_box::ContentBox;
use crate::components::guarded::Guarded;
use crate::state::articles::validate_draft;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Notice {
    Success(String),
    Error(String),
}

#[component]
pub fn UploadPage() -> impl IntoView {
    view! {
        <Guarded requirement=Requirement::Authenticated>
            <UploadForm/>
        </Guarded>
    }
}

#[component]
fn UploadForm() -> impl IntoView {
    let title = RwSignal::new(String::new());
    let author = RwSignal::new(String::new());
    let markdown = RwSignal::new(String::new());
    let html = RwSignal::new(String::new());
    let notice = RwSignal::new(None::<Notice>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let draft = match validate_draft(&title.get(), &author.get(), &html.get()) {
            Ok(draft) => draft,
            Err(message) => {
                notice.set(Some(Notice::Error(message)));
                return;
            }
        };
        busy.set(true);
        notice.set(None);

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match crate::net::api::create_article(&draft).await {
                Ok(_) => {
                    title.set(String::new());
                    author.set(String::new());
                    markdown.set(String::new());
                    notice.set(Some(Notice::Success("Article submitted for review.".to_owned())));
                }
                Err(e) => notice.set(Some(Notice::Error(e))),
            }
            busy.set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = draft;
            busy.set(false);
        }
    };

    view! {
        <div class="page upload-page">
            <h1 class="page__title">"Upload Article"</h1>
            <p class="page__subtitle">"New articles are saved as drafts until an officer reviews them."</p>
            {move || {
                notice
                    .get()
                    .map(|n| match n {
                        Notice::Success(text) => view! { <p class="notice notice--success">{text}</p> }.into_any(),
                        Notice::Error(text) => view! { <p class="notice notice--error">{text}</p> }.into_any(),
                    })
            }}
            <form class="upload-form" on:submit=on_submit>
                <label class="form-label" for="upload-title">"Title"</label>
                <input
                    id="upload-title"
                    class="form-input"
                    type="text"
                    prop:value=move || title.get()
                    on:input=move |ev| title.set(event_target_value(&ev))
                />
                <label class="form-label" for="upload-author">"Author"</label>
                <input
                    id="upload-author"
                    class="form-input"
                    type="text"
                    prop:value=move || author.get()
                    on:input=move |ev| author.set(event_target_value(&ev))
                />
                <span class="form-label">"Content"</span>
                <ContentBox markdown=markdown html=html/>
                <button class="btn btn--primary" type="submit" disabled=move || busy.get()>
                    {move || if busy.get() { "Submitting..." } else { "Submit Article" }}
                </button>
            </form>
        </div>
    }
}
