use crate::extract::{Registered, SignedIn};
use agora_app::domain::{Profile, RegisterProfile, UpdateProfile};
use agora_app::AppContext;
use agora_errors::AppError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/profile", post(register).put(update))
}

async fn register(
    State(ctx): State<AppContext>,
    signed_in: SignedIn,
    Json(form): Json<RegisterProfile>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    let profile = ctx.profiles.register(&signed_in.identity, form).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn update(
    State(ctx): State<AppContext>,
    Registered(profile): Registered,
    Json(form): Json<UpdateProfile>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(ctx.profiles.update(&profile, form).await?))
}
