use crate::components::{ErrorDisplay, LoadingSpinner};
use crate::server::{interest_counts, voted_events};
use agora_app::domain::VoteKind;
use leptos::prelude::*;

/// Participant home: vote totals and the events marked as interesting.
#[component]
pub fn ParticipantPage() -> impl IntoView {
    let counts = Resource::new(|| (), |_| interest_counts());
    let interested = Resource::new(|| (), |_| voted_events(VoteKind::Interested));

    view! {
        <section>
            <h2>"Mes réponses"</h2>
            <Suspense fallback=|| view! { <LoadingSpinner label="Chargement de vos réponses..."/> }>
                {move || counts.get().map(|result| match result {
                    Ok(counts) => view! {
                        <div class="stats">
                            <div class="stats__card">
                                <p class="stats__value">{counts.interested}</p>
                                <p>"Intéressé"</p>
                            </div>
                            <div class="stats__card">
                                <p class="stats__value">{counts.not_interested}</p>
                                <p>"Pas intéressé"</p>
                            </div>
                        </div>
                    }.into_any(),
                    Err(e) => view! { <ErrorDisplay message=e.to_string()/> }.into_any(),
                })}
                {move || interested.get().map(|result| match result {
                    Ok(events) => events.into_iter().map(|item| {
                        let owner = item.owner.map(|o| o.full_name).unwrap_or_default();
                        view! {
                            <article class="event-card">
                                <h3 class="event-card__title">{item.event.title}</h3>
                                <p class="event-card__meta">
                                    {item.event.start_date.format("%d/%m/%Y %H:%M").to_string()}
                                    " · " {owner}
                                </p>
                            </article>
                        }
                    }).collect_view().into_any(),
                    Err(e) => view! { <ErrorDisplay message=e.to_string()/> }.into_any(),
                })}
            </Suspense>
        </section>
    }
}
