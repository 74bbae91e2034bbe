use crate::domain::IdentityUser;
use agora_errors::AppError;
use oauth2::{CsrfToken, PkceCodeVerifier};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

const IDENTITY_USER_KEY: &str = "identity_user";
const OAUTH_STATE_KEY: &str = "oauth_state";

/// CSRF state and PKCE verifier kept between `/auth/login` and the callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthState {
    csrf: String,
    pkce_verifier: String,
}

impl OAuthState {
    pub fn new(csrf: &CsrfToken, verifier: &PkceCodeVerifier) -> Self {
        Self {
            csrf: csrf.secret().clone(),
            pkce_verifier: verifier.secret().clone(),
        }
    }

    /// Consumes the state, returning the verifier when `returned` matches.
    pub fn verify(self, returned: &str) -> Result<PkceCodeVerifier, AppError> {
        if self.csrf != returned {
            return Err(AppError::Identity("état OAuth invalide".to_string()));
        }
        Ok(PkceCodeVerifier::new(self.pkce_verifier))
    }
}

/// Typed view over the HTTP session: the identity user lives here and
/// nowhere else.
#[derive(Clone)]
pub struct IdentitySession {
    session: Session,
}

fn session_error(e: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session: {e}"))
}

impl IdentitySession {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn current_user(&self) -> Result<Option<IdentityUser>, AppError> {
        self.session
            .get::<IdentityUser>(IDENTITY_USER_KEY)
            .await
            .map_err(session_error)
    }

    pub async fn has_session(&self) -> bool {
        matches!(self.current_user().await, Ok(Some(_)))
    }

    /// Stores the user under a fresh session id.
    pub async fn sign_in(&self, user: &IdentityUser) -> Result<(), AppError> {
        self.session.cycle_id().await.map_err(session_error)?;
        self.session
            .insert(IDENTITY_USER_KEY, user)
            .await
            .map_err(session_error)
    }

    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.session.flush().await.map_err(session_error)
    }

    pub async fn store_oauth_state(&self, state: OAuthState) -> Result<(), AppError> {
        self.session
            .insert(OAUTH_STATE_KEY, state)
            .await
            .map_err(session_error)
    }

    /// The state is single-use; it is removed even when verification fails.
    pub async fn take_oauth_state(&self) -> Result<Option<OAuthState>, AppError> {
        self.session
            .remove::<OAuthState>(OAUTH_STATE_KEY)
            .await
            .map_err(session_error)
    }
}
