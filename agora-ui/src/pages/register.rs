use crate::components::ErrorDisplay;
use crate::server::RegisterProfileFn;
use crate::session::use_session;
use agora_app::domain::Role;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

/// One-time profile creation after the first sign-in.
#[component]
pub fn RegisterPage() -> impl IntoView {
    let register = ServerAction::<RegisterProfileFn>::new();
    let session = use_session();
    let navigate = use_navigate();

    Effect::new(move |_| {
        if let Some(Ok(profile)) = register.value().get() {
            session.refetch();
            navigate(profile.role().home_path(), Default::default());
        }
    });

    view! {
        <ActionForm action=register attr:class="form">
            <h2>"Créer votre profil"</h2>
            <input class="form__input" type="text" name="full_name" placeholder="Nom complet" required/>
            <select class="form__input" name="role">
                <option value="participant">"Participant"</option>
                <option value="organizer">"Organisateur"</option>
            </select>
            <button class="button" type="submit" disabled=move || register.pending().get()>
                "Continuer"
            </button>
            {move || register.value().get().and_then(Result::err).map(|e| view! {
                <ErrorDisplay message=e.to_string()/>
            })}
        </ActionForm>
    }
}
