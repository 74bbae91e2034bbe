use super::EventVoting;
use agora_app::domain::{Event, EventStatus};
use leptos::prelude::*;

#[component]
pub fn StatusBadge(status: EventStatus) -> impl IntoView {
    let (class, label) = match status {
        EventStatus::Official => ("badge badge--official", "Officiel"),
        EventStatus::Draft => ("badge badge--draft", "Brouillon"),
    };
    view! { <span class=class>{label}</span> }
}

#[component]
pub fn EventCard(event: Event, #[prop(into)] can_vote: Signal<bool>) -> impl IntoView {
    let dates = format!(
        "{} → {}",
        event.start_date.format("%d/%m/%Y %H:%M"),
        event.end_date.format("%d/%m/%Y %H:%M")
    );
    let location = event.location.clone().unwrap_or_default();

    view! {
        <article class="event-card">
            {event.image_url.clone().map(|src| view! { <img class="event-card__image" src=src alt=""/> })}
            <h3 class="event-card__title">{event.title.clone()}</h3>
            <p class="event-card__meta">
                <StatusBadge status=event.status/>
                " " {dates} " " {location}
            </p>
            <p>{event.description.clone()}</p>
            <p class="event-card__meta">"Contact : " {event.contact.clone()}</p>
            <EventVoting event_id=event.id can_vote=can_vote/>
        </article>
    }
}
