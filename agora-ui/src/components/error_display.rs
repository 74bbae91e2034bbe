use agora_errors::FieldErrors;
use leptos::prelude::*;

/// Banner for a failed load or save. Server errors arrive already phrased for
/// the user and are shown as-is.
#[component]
pub fn ErrorDisplay(
    #[prop(into)] message: String,
    #[prop(into, default = "Une erreur est survenue".to_string())] title: String,
    /// Per-field messages listed under the banner.
    #[prop(optional)]
    fields: Option<FieldErrors>,
    #[prop(optional)] on_retry: Option<Callback<()>>,
) -> impl IntoView {
    let fields = fields.filter(|f| !f.is_empty()).map(|fields| {
        view! {
            <ul class="error__fields">
                {fields.iter().map(|e| view! { <li>{e.message.clone()}</li> }).collect_view()}
            </ul>
        }
    });

    view! {
        <div class="error" role="alert">
            <p class="error__title">{title}</p>
            <p class="error__message">{message}</p>
            {fields}
            {on_retry.map(|retry| view! {
                <button class="error__retry" on:click=move |_| retry.run(())>
                    "Réessayer"
                </button>
            })}
        </div>
    }
}

/// Inline message under a form input, shown while `field` has an error.
#[component]
pub fn FieldMessage(errors: RwSignal<FieldErrors>, field: &'static str) -> impl IntoView {
    move || {
        errors
            .with(|e| e.get(field).map(str::to_string))
            .map(|message| view! { <p class="form__error">{message}</p> })
    }
}
