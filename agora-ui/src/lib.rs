pub mod components;
pub mod pages;
pub mod realtime;
pub mod server;
pub mod session;

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use agora_app::domain::Role;
use components::NotificationBell;
use pages::{
    EditEventPage, EventListPage, NewEventPage, OrganizerPage, ParticipantPage, ProfileEditPage,
    RegisterPage,
};
use session::{provide_session, RoleGuard};

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_session();

    view! {
        <Title text="Agora | Événements du campus"/>
        <Meta name="description" content="Découvrez les événements de votre communauté et indiquez votre intérêt"/>

        <Router>
            <main class="container">
                <TopBar/>
                <Routes fallback=|| "Page introuvable">
                    <Route path=path!("/") view=EventListPage/>
                    <Route path=path!("/register") view=RegisterPage/>
                    <Route
                        path=path!("/organizer/profiles")
                        view=|| view! { <RoleGuard required=Role::Organizer><OrganizerPage/></RoleGuard> }
                    />
                    <Route
                        path=path!("/organizer/events/new")
                        view=|| view! { <RoleGuard required=Role::Organizer><NewEventPage/></RoleGuard> }
                    />
                    <Route
                        path=path!("/organizer/events/:id/edit")
                        view=|| view! { <RoleGuard required=Role::Organizer><EditEventPage/></RoleGuard> }
                    />
                    <Route
                        path=path!("/profile/edit")
                        view=|| view! { <RoleGuard><ProfileEditPage/></RoleGuard> }
                    />
                    <Route
                        path=path!("/user/profiles")
                        view=|| view! { <RoleGuard required=Role::Participant><ParticipantPage/></RoleGuard> }
                    />
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn TopBar() -> impl IntoView {
    let session = session::use_session();

    view! {
        <header class="topbar">
            <a class="topbar__brand" href="/">"Agora"</a>
            <div class="topbar__actions">
                <Suspense fallback=|| ()>
                    {move || session.get().map(|result| {
                        let view_data = result.ok();
                        match view_data.as_ref().and_then(|s| s.profile.clone()) {
                            Some(profile) => view! {
                                <NotificationBell/>
                                <a class="button button--ghost" href=profile.role().home_path()>
                                    {profile.initials()}
                                </a>
                                <a class="button button--ghost" href="/profile/edit">"Mon profil"</a>
                                <form action="/auth/logout" method="post">
                                    <button class="button" type="submit">"Déconnexion"</button>
                                </form>
                            }.into_any(),
                            None if view_data.as_ref().is_some_and(|s| s.identity.is_some()) => view! {
                                <a class="button" href="/register">"Terminer l'inscription"</a>
                            }.into_any(),
                            None => view! {
                                <a class="button" href="/auth/login" rel="external">"Se connecter avec Google"</a>
                            }.into_any(),
                        }
                    })}
                </Suspense>
            </div>
        </header>
    }
}

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
