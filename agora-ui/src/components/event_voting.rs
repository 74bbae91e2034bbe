use crate::realtime;
use crate::server::{cast_vote, vote_state};
use agora_app::domain::{EventId, VoteKind, VoteState};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Interest / no-interest buttons with live counts.
#[component]
pub fn EventVoting(event_id: EventId, #[prop(into)] can_vote: Signal<bool>) -> impl IntoView {
    let state = RwSignal::new(VoteState::default());
    let pending = RwSignal::new(false);

    Effect::new(move |_| {
        spawn_local(async move {
            match vote_state(event_id).await {
                Ok(loaded) => state.set(loaded),
                Err(e) => leptos::logging::error!("vote state for event {event_id} failed: {e}"),
            }
        });
    });

    let stream = realtime::listen(
        &format!("/api/events/{event_id}/votes/stream"),
        "vote",
        move |live: VoteState| state.set(live),
    );
    StoredValue::new_local(stream);

    let click = move |kind: VoteKind| {
        if pending.get_untracked() || !can_vote.get_untracked() {
            return;
        }
        pending.set(true);
        spawn_local(async move {
            match cast_vote(event_id, kind).await {
                Ok(updated) => state.set(updated),
                // Dropped: the buttons keep the last known state.
                Err(e) => leptos::logging::error!("vote on event {event_id} failed: {e}"),
            }
            pending.set(false);
        });
    };

    let button_class = move |kind: VoteKind| {
        if state.get().mine == Some(kind) {
            "voting__button voting__button--active"
        } else {
            "voting__button"
        }
    };

    view! {
        <div class="voting">
            <button
                class=move || button_class(VoteKind::Interested)
                disabled=move || pending.get() || !can_vote.get()
                on:click=move |_| click(VoteKind::Interested)
            >
                "Intéressé · " {move || state.get().stats.interests}
            </button>
            <button
                class=move || button_class(VoteKind::NotInterested)
                disabled=move || pending.get() || !can_vote.get()
                on:click=move |_| click(VoteKind::NotInterested)
            >
                "Pas intéressé · " {move || state.get().stats.no_interests}
            </button>
        </div>
    }
}
