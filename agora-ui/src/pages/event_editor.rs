use crate::components::{ErrorDisplay, FieldMessage, LoadingSpinner};
use crate::server::{create_event, get_event, update_event};
use agora_app::domain::{EventForm, EventId, EventStatus};
use agora_errors::FieldErrors;
use chrono::{DateTime, NaiveDateTime, Utc};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_params_map};

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Reads a `datetime-local` input value. Browsers may append seconds.
pub fn parse_local(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, LOCAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn format_local(date: DateTime<Utc>) -> String {
    date.format(LOCAL_FORMAT).to_string()
}

/// Create form at `/organizer/events/new`.
#[component]
pub fn NewEventPage() -> impl IntoView {
    view! { <EventEditor initial=EventForm::default() editing=None/> }
}

/// Edit form at `/organizer/events/:id/edit`, pre-filled from the stored event.
#[component]
pub fn EditEventPage() -> impl IntoView {
    let params = use_params_map();
    let id = move || {
        params
            .read()
            .get("id")
            .and_then(|raw| raw.parse::<EventId>().ok())
    };
    let event = Resource::new(id, |id| async move {
        match id {
            Some(id) => get_event(id).await.map(Some),
            None => Ok(None),
        }
    });

    view! {
        <Suspense fallback=|| view! { <LoadingSpinner label="Chargement de l'événement..."/> }>
            {move || event.get().map(|result| match result {
                Ok(Some(found)) => view! {
                    <EventEditor initial=EventForm::from(&found.event) editing=Some(found.event.id)/>
                }.into_any(),
                Ok(None) => view! { <ErrorDisplay message="Événement introuvable"/> }.into_any(),
                Err(e) => view! { <ErrorDisplay message=e.to_string()/> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
fn EventEditor(initial: EventForm, editing: Option<EventId>) -> impl IntoView {
    let title = RwSignal::new(initial.title);
    let description = RwSignal::new(initial.description);
    let contact = RwSignal::new(initial.contact);
    let location = RwSignal::new(initial.location);
    let status = RwSignal::new(initial.status.unwrap_or(EventStatus::Draft));
    let start_date = RwSignal::new(initial.start_date.map(format_local).unwrap_or_default());
    let end_date = RwSignal::new(initial.end_date.map(format_local).unwrap_or_default());
    let image_url = RwSignal::new(initial.image_url.unwrap_or_default());

    let errors = RwSignal::new(FieldErrors::new());
    let failure = RwSignal::new(None::<String>);
    let pending = RwSignal::new(false);
    let navigate = use_navigate();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if pending.get_untracked() {
            return;
        }
        let form = EventForm {
            title: title.get_untracked(),
            description: description.get_untracked(),
            contact: contact.get_untracked(),
            location: location.get_untracked(),
            status: Some(status.get_untracked()),
            start_date: parse_local(&start_date.get_untracked()),
            end_date: parse_local(&end_date.get_untracked()),
            image_url: Some(image_url.get_untracked()).filter(|u| !u.trim().is_empty()),
        };
        let checked = match editing {
            Some(_) => form.clone().validate_edit(),
            None => form.clone().validate(Utc::now().date_naive()),
        };
        if let Err(field_errors) = checked {
            errors.set(field_errors);
            return;
        }
        errors.set(FieldErrors::new());
        failure.set(None);
        pending.set(true);

        let navigate = navigate.clone();
        spawn_local(async move {
            let saved = match editing {
                Some(id) => update_event(id, form).await,
                None => create_event(form).await,
            };
            pending.set(false);
            match saved {
                Ok(_) => navigate("/organizer/profiles", Default::default()),
                Err(e) => failure.set(Some(e.to_string())),
            }
        });
    };

    let heading = if editing.is_some() { "Modifier l'événement" } else { "Nouvel événement" };

    view! {
        <form class="form" on:submit=on_submit>
            <h2>{heading}</h2>
            {move || failure.get().map(|message| view! {
                <ErrorDisplay title="L'enregistrement a échoué" message=message/>
            })}
            {move || (!errors.with(FieldErrors::is_empty)).then(|| view! {
                <ErrorDisplay
                    title="Formulaire incomplet"
                    message="Corrigez les champs signalés"
                    fields=errors.get()
                />
            })}

            <label class="form__label">"Titre"
                <input class="form__input" type="text" bind:value=title/>
            </label>
            <FieldMessage errors=errors field="title"/>

            <label class="form__label">"Description"
                <textarea class="form__input" rows="5" bind:value=description></textarea>
            </label>
            <FieldMessage errors=errors field="description"/>

            <label class="form__label">"Début"
                <input class="form__input" type="datetime-local" bind:value=start_date/>
            </label>
            <FieldMessage errors=errors field="start_date"/>

            <label class="form__label">"Fin"
                <input class="form__input" type="datetime-local" bind:value=end_date/>
            </label>
            <FieldMessage errors=errors field="end_date"/>

            <label class="form__label">"Lieu"
                <input class="form__input" type="text" bind:value=location/>
            </label>
            <FieldMessage errors=errors field="location"/>

            <label class="form__label">"Contact"
                <input class="form__input" type="text" bind:value=contact/>
            </label>
            <FieldMessage errors=errors field="contact"/>

            <label class="form__label">"Statut"
                <select
                    class="form__input"
                    prop:value=move || status.get().as_str()
                    on:change=move |ev| {
                        if let Ok(parsed) = event_target_value(&ev).parse::<EventStatus>() {
                            status.set(parsed);
                        }
                    }
                >
                    <option value="draft">{EventStatus::Draft.label()}</option>
                    <option value="official">{EventStatus::Official.label()}</option>
                </select>
            </label>
            <FieldMessage errors=errors field="status"/>

            <label class="form__label">"Image (URL)"
                <input class="form__input" type="url" bind:value=image_url/>
            </label>

            <div class="form__actions">
                <a class="button button--ghost" href="/organizer/profiles">"Annuler"</a>
                <button class="button" type="submit" disabled=move || pending.get()>
                    {move || if pending.get() { "Enregistrement..." } else { "Enregistrer" }}
                </button>
            </div>
        </form>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_local_input() {
        let expected = Utc.with_ymd_and_hms(2025, 6, 21, 18, 30, 0).unwrap();
        assert_eq!(parse_local("2025-06-21T18:30"), Some(expected));
        assert_eq!(parse_local("2025-06-21T18:30:00"), Some(expected));
        assert_eq!(parse_local(""), None);
        assert_eq!(parse_local("21/06/2025 18:30"), None);
    }

    #[test]
    fn test_empty_date_reports_field_error() {
        let form = EventForm {
            title: "Ciné-club".to_string(),
            description: "Projection".to_string(),
            contact: "cine@univ.fr".to_string(),
            location: "Salle 3".to_string(),
            status: Some(EventStatus::Draft),
            start_date: parse_local(""),
            end_date: parse_local("2025-06-21T22:00"),
            image_url: None,
        };
        let errors = form.validate_edit().unwrap_err();
        assert_eq!(errors.get("start_date"), Some("La date de début est requise"));
        assert!(errors.get("end_date").is_none());
    }

    #[test]
    fn test_stored_dates_fill_inputs() {
        let date = Utc.with_ymd_and_hms(2025, 1, 5, 9, 0, 0).unwrap();
        assert_eq!(format_local(date), "2025-01-05T09:00");
        assert_eq!(parse_local(&format_local(date)), Some(date));
    }
}
