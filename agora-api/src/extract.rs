use agora_app::domain::{IdentityUser, Profile};
use agora_app::infrastructure::auth::IdentitySession;
use agora_app::AppContext;
use agora_errors::AppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

async fn identity_session(parts: &mut Parts, ctx: &AppContext) -> Result<IdentitySession, AppError> {
    let session = Session::from_request_parts(parts, ctx)
        .await
        .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;
    Ok(IdentitySession::new(session))
}

/// Any request: the session plus whatever it currently holds.
pub struct Viewer {
    pub session: IdentitySession,
    pub identity: Option<IdentityUser>,
    pub profile: Option<Profile>,
}

impl FromRequestParts<AppContext> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, ctx: &AppContext) -> Result<Self, Self::Rejection> {
        let session = identity_session(parts, ctx).await?;
        let identity = session.current_user().await?;
        let profile = match &identity {
            Some(identity) => ctx.profiles.resolve(identity).await?,
            None => None,
        };
        Ok(Self {
            session,
            identity,
            profile,
        })
    }
}

/// Signed in with the identity provider, registered or not.
pub struct SignedIn {
    pub session: IdentitySession,
    pub identity: IdentityUser,
}

impl FromRequestParts<AppContext> for SignedIn {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, ctx: &AppContext) -> Result<Self, Self::Rejection> {
        let session = identity_session(parts, ctx).await?;
        let identity = session
            .current_user()
            .await?
            .ok_or(AppError::Unauthenticated)?;
        Ok(Self { session, identity })
    }
}

/// Signed in and registered.
pub struct Registered(pub Profile);

impl FromRequestParts<AppContext> for Registered {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, ctx: &AppContext) -> Result<Self, Self::Rejection> {
        let SignedIn { identity, .. } = SignedIn::from_request_parts(parts, ctx).await?;
        Ok(Self(ctx.profiles.require(&identity).await?))
    }
}
