//! Root application component with routing and the session context.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{Route, Router, Routes},
};
use session::SessionState;

use crate::components::navbar::Navbar;
use crate::pages::{
    apply::ApplyPage, article::ArticlePage, dashboard::DashboardPage, home::HomePage, invite::InvitePage,
    login::LoginPage, manage_account::ManageAccountPage, manage_articles::ManageArticlesPage,
    manage_users::ManageUsersPage, my_articles::MyArticlesPage, research::ResearchPage, team::TeamPage,
    upload::UploadPage,
};
use crate::state::auth;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides the session signal, installs the session store in the browser
/// and sets up client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = RwSignal::new(SessionState::default());
    provide_context(session);
    auth::install(session);
    on_cleanup(auth::teardown);

    view! {
        <Stylesheet id="leptos" href="/pkg/sage.css"/>
        <Title text="SAGE"/>

        <Router>
            <Navbar/>
            <main class="site-main">
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=StaticSegment("") view=HomePage/>
                    <Route path=StaticSegment("research") view=ResearchPage/>
                    <Route path=StaticSegment("team") view=TeamPage/>
                    <Route path=StaticSegment("apply") view=ApplyPage/>
                    <Route path=(StaticSegment("article"), ParamSegment("id")) view=ArticlePage/>
                    <Route path=StaticSegment("login") view=LoginPage/>
                    <Route path=StaticSegment("dashboard") view=DashboardPage/>
                    <Route path=StaticSegment("upload") view=UploadPage/>
                    <Route path=StaticSegment("my-articles") view=MyArticlesPage/>
                    <Route path=StaticSegment("manage-articles") view=ManageArticlesPage/>
                    <Route path=StaticSegment("manage-users") view=ManageUsersPage/>
                    <Route path=StaticSegment("invite") view=InvitePage/>
                    <Route path=StaticSegment("manage-account") view=ManageAccountPage/>
                </Routes>
            </main>
        </Router>
    }
}
