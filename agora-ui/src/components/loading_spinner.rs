use leptos::prelude::*;

/// Placeholder while a resource loads; `label` names what is loading.
#[component]
pub fn LoadingSpinner(#[prop(into)] label: String) -> impl IntoView {
    view! {
        <div class="loading" aria-busy="true">
            <div class="loading__spinner"></div>
            <p class="loading__text">{label}</p>
        </div>
    }
}
