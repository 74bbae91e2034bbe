use crate::extract::Registered;
use agora_app::domain::{EventWithOwner, InterestCounts, VoteKind};
use agora_app::AppContext;
use agora_errors::AppError;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/interests", get(voted_events))
        .route("/api/interests/counts", get(counts))
}

#[derive(Deserialize)]
struct KindParam {
    kind: Option<VoteKind>,
}

async fn voted_events(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
    Query(param): Query<KindParam>,
) -> Result<Json<Vec<EventWithOwner>>, AppError> {
    let kind = param.kind.unwrap_or(VoteKind::Interested);
    Ok(Json(ctx.stats.voted_events(&profile, kind).await?))
}

async fn counts(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
) -> Result<Json<InterestCounts>, AppError> {
    Ok(Json(ctx.stats.interest_counts(&profile).await?))
}
