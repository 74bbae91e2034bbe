use crate::extract::{SignedIn, Viewer};
use agora_app::domain::{AuthEvent, AuthStatus, IdentityUser, Profile, LANDING_PATH, REGISTER_PATH};
use agora_app::infrastructure::auth::OAuthState;
use agora_app::AppContext;
use agora_errors::AppError;
use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .route("/auth/logout", post(logout))
        .route("/api/me", get(me))
}

async fn login(State(ctx): State<AppContext>, viewer: Viewer) -> Result<Redirect, AppError> {
    let (url, csrf, verifier) = ctx.oauth.authorize_url();
    viewer
        .session
        .store_oauth_state(OAuthState::new(&csrf, &verifier))
        .await?;
    Ok(Redirect::to(&url))
}

#[derive(Deserialize)]
struct CallbackParams {
    code: String,
    state: String,
}

async fn callback(
    State(ctx): State<AppContext>,
    viewer: Viewer,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AppError> {
    let pending = viewer
        .session
        .take_oauth_state()
        .await?
        .ok_or_else(|| AppError::Identity("aucune connexion en cours".to_string()))?;
    let verifier = pending.verify(&params.state)?;

    let identity = ctx.oauth.exchange_code(&params.code, verifier).await?;
    viewer.session.sign_in(&identity).await?;

    let profile = ctx.profiles.resolve(&identity).await?;
    ctx.auth_events.emit(
        AuthEvent::SignedIn,
        &identity.id,
        profile.as_ref().map(Profile::user_id),
    );

    let target = match &profile {
        Some(profile) => profile.role().home_path(),
        None => REGISTER_PATH,
    };
    Ok(Redirect::to(target))
}

async fn logout(State(ctx): State<AppContext>, signed_in: SignedIn) -> Result<Redirect, AppError> {
    let account_id = ctx
        .profiles
        .resolve(&signed_in.identity)
        .await?
        .map(|p| p.user_id());
    signed_in.session.sign_out().await?;
    ctx.auth_events
        .emit(AuthEvent::SignedOut, &signed_in.identity.id, account_id);
    Ok(Redirect::to(LANDING_PATH))
}

#[derive(Serialize)]
struct Me {
    status: AuthStatus,
    identity: Option<IdentityUser>,
    profile: Option<Profile>,
    registered: bool,
}

async fn me(viewer: Viewer) -> Json<Me> {
    let status = AuthStatus::default().apply(AuthEvent::InitialSession, viewer.identity.is_some());
    Json(Me {
        status,
        registered: viewer.profile.is_some(),
        identity: viewer.identity,
        profile: viewer.profile,
    })
}
