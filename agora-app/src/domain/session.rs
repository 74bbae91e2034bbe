use serde::{Deserialize, Serialize};

/// User as known to the identity provider. `id` is the provider's subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl IdentityUser {
    pub fn new(id: String, email: String) -> Self {
        Self {
            id,
            email,
            name: None,
            avatar_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    PasswordRecovery,
    UserUpdated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    #[default]
    Loading,
    SignedIn,
    SignedOut,
}

impl AuthStatus {
    pub fn apply(self, event: AuthEvent, has_session: bool) -> Self {
        match event {
            AuthEvent::InitialSession if has_session => Self::SignedIn,
            AuthEvent::InitialSession => Self::SignedOut,
            AuthEvent::SignedIn => Self::SignedIn,
            AuthEvent::SignedOut => Self::SignedOut,
            AuthEvent::TokenRefreshed
            | AuthEvent::PasswordRecovery
            | AuthEvent::UserUpdated => self,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn)
    }
}
