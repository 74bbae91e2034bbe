use crate::components::{ErrorDisplay, LoadingSpinner, StatusBadge};
use crate::server::{delete_event, organizer_dashboard, organizer_stats};
use agora_app::domain::{EventId, EventStatus, SortDirection, StatusFilter};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Organizer home: own events by status plus response statistics.
#[component]
pub fn OrganizerPage() -> impl IntoView {
    let dashboard = Resource::new(|| (), |_| organizer_dashboard());
    let stats = Resource::new(|| (), |_| organizer_stats());
    let filter = RwSignal::new(StatusFilter::All);
    let sort = RwSignal::new(SortDirection::Desc);
    let deleting = RwSignal::new(None::<EventId>);
    let delete_failure = RwSignal::new(None::<String>);

    let remove = move |id: EventId| {
        if deleting.get_untracked().is_some() {
            return;
        }
        deleting.set(Some(id));
        delete_failure.set(None);
        spawn_local(async move {
            let result = delete_event(id).await;
            deleting.set(None);
            match result {
                Ok(()) => {
                    dashboard.refetch();
                    stats.refetch();
                }
                Err(e) => delete_failure.set(Some(e.to_string())),
            }
        });
    };

    let filter_button = move |label: &'static str, value: StatusFilter| {
        view! {
            <button
                class=move || if filter.get() == value { "button" } else { "button button--ghost" }
                on:click=move |_| filter.set(value)
            >
                {label}
            </button>
        }
    };

    view! {
        <section>
            <div class="section__header">
                <h2>"Mes événements"</h2>
                <a class="button" href="/organizer/events/new">"Nouvel événement"</a>
            </div>
            {move || delete_failure.get().map(|message| view! {
                <ErrorDisplay title="La suppression a échoué" message=message/>
            })}
            <Suspense fallback=|| view! { <LoadingSpinner label="Chargement du tableau de bord..."/> }>
                {move || stats.get().map(|result| match result {
                    Ok(stats) => view! {
                        <div class="stats">
                            <div class="stats__card">
                                <p class="stats__value">{stats.total_events}</p>
                                <p>"Événements"</p>
                            </div>
                            <div class="stats__card">
                                <p class="stats__value">{stats.total_responses}</p>
                                <p>"Réponses"</p>
                            </div>
                        </div>
                    }.into_any(),
                    Err(e) => view! { <ErrorDisplay message=e.to_string()/> }.into_any(),
                })}
                <div class="filters">
                    {filter_button("Tous", StatusFilter::All)}
                    {filter_button("Officiels", StatusFilter::Only(EventStatus::Official))}
                    {filter_button("Brouillons", StatusFilter::Only(EventStatus::Draft))}
                    <button class="button button--ghost" on:click=move |_| sort.update(|s| {
                        *s = match s {
                            SortDirection::Asc => SortDirection::Desc,
                            SortDirection::Desc => SortDirection::Asc,
                        }
                    })>
                        {move || match sort.get() {
                            SortDirection::Asc => "Date ↑",
                            SortDirection::Desc => "Date ↓",
                        }}
                    </button>
                </div>
                {move || dashboard.get().map(|result| match result {
                    Ok(view_data) => {
                        let counts = view_data.counts();
                        let events = view_data.visible(filter.get(), sort.get());
                        view! {
                            <p class="event-card__meta">
                                {format!("{} officiels · {} brouillons · {} au total", counts.official, counts.draft, counts.total)}
                            </p>
                            {events.into_iter().map(|event| {
                                let id = event.id;
                                view! {
                                    <article class="event-card">
                                        <h3 class="event-card__title">{event.title.clone()}</h3>
                                        <p class="event-card__meta">
                                            <StatusBadge status=event.status/>
                                            " " {event.start_date.format("%d/%m/%Y %H:%M").to_string()}
                                        </p>
                                        <div class="event-card__actions">
                                            <a class="button button--ghost" href=format!("/organizer/events/{id}/edit")>
                                                "Modifier"
                                            </a>
                                            <button
                                                class="button button--danger"
                                                disabled=move || deleting.get().is_some()
                                                on:click=move |_| remove(id)
                                            >
                                                {move || if deleting.get() == Some(id) { "Suppression..." } else { "Supprimer" }}
                                            </button>
                                        </div>
                                    </article>
                                }
                            }).collect_view()}
                        }.into_any()
                    }
                    Err(e) => view! { <ErrorDisplay message=e.to_string()/> }.into_any(),
                })}
            </Suspense>
        </section>
    }
}
