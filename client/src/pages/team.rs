//! Static team roster.

use leptos::prelude::*;

struct Member {
    name: &'static str,
    position: &'static str,
    major: &'static str,
}

static MEMBERS: [Member; 4] = [
    Member { name: "President", position: "Leads the organization", major: "Economics" },
    Member { name: "Vice President", position: "Runs member programs", major: "Political Science" },
    Member { name: "Editor in Chief", position: "Reviews submitted articles", major: "English" },
    Member { name: "Treasurer", position: "Manages club finances", major: "Finance" },
];

#[component]
pub fn TeamPage() -> impl IntoView {
    view! {
        <div class="page team-page">
            <h1 class="page__title">"Our Team"</h1>
            <div class="team-grid">
                {MEMBERS
                    .iter()
                    .map(|m| {
                        view! {
                            <div class="team-card">
                                <div class="team-card__avatar">{m.name.chars().next().unwrap_or('?')}</div>
                                <h3 class="team-card__name">{m.name}</h3>
                                <p class="team-card__position">{m.position}</p>
                                <p class="team-card__major">{m.major}</p>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
