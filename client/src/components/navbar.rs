//! Site navigation bar with theme toggle and user menu.

use leptos::prelude::*;

use crate::state::auth::AuthSignal;
use crate::util::dark_mode;

const LINKS: [(&str, &str); 4] = [("/", "Home"), ("/research", "Research"), ("/team", "Team"), ("/apply", "Apply")];

#[component]
pub fn Navbar() -> impl IntoView {
    let auth = expect_context::<AuthSignal>();
    let dark = RwSignal::new(false);
    let menu_open = RwSignal::new(false);

    // Theme preference is only known in the browser; read it after hydration.
    Effect::new(move || {
        let preferred = dark_mode::read_preference();
        dark_mode::apply(preferred);
        dark.set(preferred);
    });

    let user_label = move || {
        auth.get()
            .user
            .map(|u| u.username)
            .unwrap_or_default()
    };
    let initial = move || {
        user_label()
            .chars()
            .next()
            .map_or('?', |c| c.to_ascii_uppercase())
            .to_string()
    };

    let on_logout = move |_| {
        menu_open.set(false);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let route = crate::state::auth::logout().await;
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href(&route);
            }
        });
    };

    view! {
        <nav class="navbar">
            <a class="navbar__brand" href="/">"SAGE"</a>
            <ul class="navbar__links">
                {LINKS
                    .into_iter()
                    .map(|(href, label)| view! { <li><a class="navbar__link" href=href>{label}</a></li> })
                    .collect_view()}
            </ul>
            <span class="navbar__spacer"></span>
            <button
                class="btn navbar__theme"
                title="Toggle theme"
                on:click=move |_| dark.set(dark_mode::toggle(dark.get_untracked()))
            >
                {move || if dark.get() { "☀" } else { "☾" }}
            </button>
            <Show
                when=move || auth.get().user.is_some()
                fallback=|| view! { <a class="btn btn--primary navbar__signin" href="/login">"Sign In"</a> }
            >
                <div class="navbar__user">
                    <button
                        class="navbar__avatar"
                        title=user_label
                        on:click=move |_| menu_open.update(|open| *open = !*open)
                    >
                        {initial}
                    </button>
                    <Show when=move || menu_open.get()>
                        <div class="navbar__menu" on:click=move |_| menu_open.set(false)>
                            <span class="navbar__menu-name">{user_label}</span>
                            <a class="navbar__menu-item" href="/dashboard">"Dashboard"</a>
                            <a class="navbar__menu-item" href="/manage-account">"Manage Account"</a>
                            <button class="navbar__menu-item" on:click=on_logout>"Sign Out"</button>
                        </div>
                    </Show>
                </div>
            </Show>
        </nav>
    }
}
