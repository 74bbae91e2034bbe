use crate::extract::Registered;
use agora_app::domain::{
    DashboardView, Event, EventForm, EventId, EventStatus, EventWithOwner, OrganizerStats,
    SortDirection, StatusCounts, StatusFilter,
};
use agora_app::AppContext;
use agora_errors::AppError;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Upper bound on a single page request.
const MAX_PAGE_SIZE: u64 = 50;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/events", get(page).post(create))
        .route("/api/events/{id}", get(show).put(update).delete(remove))
        .route("/api/organizer/events", get(dashboard))
        .route("/api/organizer/stats", get(organizer_stats))
}

#[derive(Deserialize)]
struct PageParams {
    #[serde(default)]
    offset: u64,
    limit: Option<u64>,
}

async fn page(
    State(ctx): State<AppContext>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Event>>, AppError> {
    let limit = params
        .limit
        .unwrap_or_else(|| ctx.feed_page_size())
        .clamp(1, MAX_PAGE_SIZE);
    Ok(Json(ctx.events.page(params.offset, limit).await?))
}

async fn show(
    State(ctx): State<AppContext>,
    Path(id): Path<EventId>,
) -> Result<Json<EventWithOwner>, AppError> {
    Ok(Json(ctx.events.get(id).await?))
}

async fn create(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
    Json(form): Json<EventForm>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = ctx
        .events
        .create(&profile, form, Utc::now().date_naive())
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn update(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
    Path(id): Path<EventId>,
    Json(form): Json<EventForm>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(ctx.events.update(&profile, id, form).await?))
}

async fn remove(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
    Path(id): Path<EventId>,
) -> Result<StatusCode, AppError> {
    ctx.events.delete(&profile, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct DashboardParams {
    status: Option<EventStatus>,
    #[serde(default)]
    sort: SortDirection,
}

#[derive(Serialize)]
struct Dashboard {
    counts: StatusCounts,
    events: Vec<Event>,
}

async fn dashboard(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
    Query(params): Query<DashboardParams>,
) -> Result<Json<Dashboard>, AppError> {
    let view: DashboardView = ctx.events.dashboard(&profile).await?;
    let filter = params.status.map_or(StatusFilter::All, StatusFilter::Only);
    Ok(Json(Dashboard {
        counts: view.counts(),
        events: view.visible(filter, params.sort),
    }))
}

async fn organizer_stats(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
) -> Result<Json<OrganizerStats>, AppError> {
    Ok(Json(ctx.stats.organizer_stats(&profile).await?))
}
