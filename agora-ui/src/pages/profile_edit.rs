use crate::components::ErrorDisplay;
use crate::server::UpdateProfileFn;
use crate::session::use_session;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

/// Name and picture edit for any registered account.
#[component]
pub fn ProfileEditPage() -> impl IntoView {
    let update = ServerAction::<UpdateProfileFn>::new();
    let session = use_session();
    let navigate = use_navigate();

    Effect::new(move |_| {
        if let Some(Ok(profile)) = update.value().get() {
            session.refetch();
            navigate(profile.role().home_path(), Default::default());
        }
    });

    let current = move || {
        session
            .get()
            .and_then(Result::ok)
            .and_then(|view_data| view_data.profile)
    };

    view! {
        <Suspense fallback=|| ()>
            {move || current().map(|profile| view! {
                <ActionForm action=update attr:class="form">
                    <h2>"Modifier mon profil"</h2>
                    {move || update.value().get().and_then(Result::err).map(|e| view! {
                        <ErrorDisplay title="La mise à jour a échoué" message=e.to_string()/>
                    })}
                    <label class="form__label">"Nom complet"
                        <input
                            class="form__input"
                            type="text"
                            name="full_name"
                            value=profile.full_name().to_string()
                            required
                        />
                    </label>
                    <label class="form__label">"Photo (URL)"
                        <input
                            class="form__input"
                            type="url"
                            name="image_url"
                            value=profile.image_url().unwrap_or_default().to_string()
                        />
                    </label>
                    <button class="button" type="submit" disabled=move || update.pending().get()>
                        "Enregistrer"
                    </button>
                </ActionForm>
            })}
        </Suspense>
    }
}
