use crate::components::{ErrorDisplay, EventCard, LoadingSpinner};
use crate::server::events_page;
use crate::session::use_session;
use agora_app::domain::{
    Debounced, EventFilter, EventStatus, FeedLoad, FeedPages, FeedTail, FeedView, StatusFilter,
    SEARCH_DEBOUNCE_MS,
};
use chrono::Utc;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::time::Duration;

fn parse_status(value: &str) -> StatusFilter {
    match value {
        "official" => StatusFilter::Only(EventStatus::Official),
        "draft" => StatusFilter::Only(EventStatus::Draft),
        _ => StatusFilter::All,
    }
}

/// Paginated event feed with a status filter and a debounced search.
#[component]
pub fn EventListPage() -> impl IntoView {
    let pages = RwSignal::new(FeedPages::default());
    let load = RwSignal::new(FeedLoad::LoadingFirstPage);
    let status = RwSignal::new(StatusFilter::All);
    let search = RwSignal::new(Debounced::new(String::new()));

    let session = use_session();
    let can_vote = Signal::derive(move || {
        session
            .get()
            .and_then(|s| s.ok())
            .is_some_and(|s| s.profile.is_some())
    });

    let fetch_first = move || {
        load.set(FeedLoad::LoadingFirstPage);
        spawn_local(async move {
            match events_page(0).await {
                Ok(page) => {
                    pages.update(|p| {
                        *p = FeedPages::new(page.page_size);
                        p.push_page(page.events);
                    });
                    load.set(FeedLoad::Idle);
                }
                Err(e) => load.set(FeedLoad::Failed(e.to_string())),
            }
        });
    };

    let fetch_next = move || {
        if load.get_untracked() != FeedLoad::Idle {
            return;
        }
        let Some(offset) = pages.with_untracked(FeedPages::next_offset) else {
            return;
        };
        load.set(FeedLoad::FetchingMore);
        spawn_local(async move {
            match events_page(offset).await {
                Ok(page) => pages.update(|p| p.push_page(page.events)),
                Err(e) => leptos::logging::error!("next page failed: {e}"),
            }
            load.set(FeedLoad::Idle);
        });
    };

    Effect::new(move |_| fetch_first());

    let on_search = move |value: String| {
        search.update(|s| s.set(value, Utc::now()));
        set_timeout(
            move || {
                search.update(|s| {
                    s.settle(Utc::now());
                });
            },
            Duration::from_millis(SEARCH_DEBOUNCE_MS as u64),
        );
    };

    let feed = move || {
        let filter = EventFilter {
            status: status.get(),
            search: search.with(|s| s.settled().clone()),
        };
        pages.with(|p| p.view(&filter, &load.get()))
    };

    view! {
        <section class="feed">
            <div class="filters">
                <input
                    class="filters__search"
                    type="search"
                    placeholder="Rechercher un événement..."
                    on:input=move |ev| on_search(event_target_value(&ev))
                />
                <select class="filters__status" on:change=move |ev| status.set(parse_status(&event_target_value(&ev)))>
                    <option value="all">"Tous"</option>
                    <option value="official">"Officiels"</option>
                    <option value="draft">"Brouillons"</option>
                </select>
            </div>
            {move || match feed() {
                FeedView::LoadingFirstPage => view! { <LoadingSpinner label="Chargement des événements..."/> }.into_any(),
                FeedView::Failed(message) => view! {
                    <ErrorDisplay message=message on_retry=Callback::new(move |_| fetch_first())/>
                }.into_any(),
                FeedView::Empty { searching } => view! {
                    <p class="feed__empty">
                        {if searching { "Aucun événement ne correspond à la recherche" } else { "Aucun événement pour le moment" }}
                    </p>
                }.into_any(),
                FeedView::Items { events, tail } => view! {
                    {events.into_iter().map(|event| view! { <EventCard event=event can_vote=can_vote/> }).collect_view()}
                    <div class="feed__tail">
                        {match tail {
                            FeedTail::FetchingMore => view! { <LoadingSpinner label="Chargement de la suite..."/> }.into_any(),
                            FeedTail::MoreAvailable => view! {
                                <button class="button button--ghost" on:click=move |_| fetch_next()>"Voir plus"</button>
                            }.into_any(),
                            FeedTail::Exhausted => view! { <span>"Fin de la liste"</span> }.into_any(),
                        }}
                    </div>
                }.into_any(),
            }}
        </section>
    }
}
