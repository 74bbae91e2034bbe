use crate::extract::{Registered, Viewer};
use agora_app::application::VoteAttempt;
use agora_app::domain::{EventId, VoteKind, VoteState};
use agora_app::AppContext;
use agora_errors::AppError;
use axum::extract::{Path, State};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::routing::get;
use axum::{Json, Router};
use futures::Stream;
use serde::Deserialize;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/events/{id}/votes", get(state).post(vote))
        .route("/api/events/{id}/votes/stream", get(stream))
}

async fn state(
    State(ctx): State<AppContext>,
    viewer: Viewer,
    Path(event_id): Path<EventId>,
) -> Result<Json<VoteState>, AppError> {
    let voter = viewer.profile.as_ref().map(|p| p.user_id());
    Ok(Json(ctx.voting(event_id, voter).await?.state()))
}

#[derive(Deserialize)]
struct VoteRequest {
    kind: VoteKind,
}

async fn vote(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
    Path(event_id): Path<EventId>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<VoteState>, AppError> {
    let voting = ctx.voting(event_id, Some(profile.user_id())).await?;
    match voting.vote(request.kind).await {
        VoteAttempt::Applied(state) => Ok(Json(state)),
        VoteAttempt::InFlight => Err(AppError::Conflict(
            "Un vote est déjà en cours".to_string(),
        )),
        VoteAttempt::Unavailable => Err(AppError::Internal(
            "vote widget no longer mounted".to_string(),
        )),
        VoteAttempt::Failed(e) => Err(e),
    }
}

/// Pushes the widget state on connect and after every change.
async fn stream(
    State(ctx): State<AppContext>,
    viewer: Viewer,
    Path(event_id): Path<EventId>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, axum::Error>>>, AppError> {
    let voter = viewer.profile.as_ref().map(|p| p.user_id());
    let voting = ctx.voting(event_id, voter).await?;
    let updates = WatchStream::new(voting.subscribe()).map(move |state| {
        // The stream owns the widget for as long as the client listens.
        let _mounted = &voting;
        SseEvent::default().event("vote").json_data(state)
    });
    Ok(Sse::new(updates).keep_alive(KeepAlive::default()))
}
