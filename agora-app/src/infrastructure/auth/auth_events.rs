use crate::domain::{AccountId, AuthEvent};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthNotice {
    pub event: AuthEvent,
    pub identity_user_id: String,
    /// Known once the user has a registered account.
    pub account_id: Option<AccountId>,
}

/// Process-wide auth state changes. Holders of per-user state listen here
/// and drop it on `SignedOut`.
#[derive(Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthNotice>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }
}

impl AuthEvents {
    pub fn emit(&self, event: AuthEvent, identity_user_id: &str, account_id: Option<AccountId>) {
        match event {
            AuthEvent::SignedIn | AuthEvent::SignedOut | AuthEvent::InitialSession => {
                tracing::info!(?event, identity_user_id, "auth state changed")
            }
            _ => tracing::debug!(?event, identity_user_id, "auth event"),
        }
        let _ = self.sender.send(AuthNotice {
            event,
            identity_user_id: identity_user_id.to_string(),
            account_id,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthNotice> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_sign_out() {
        let events = AuthEvents::default();
        let mut rx = events.subscribe();
        events.emit(AuthEvent::SignedOut, "google-1", Some(4));
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.event, AuthEvent::SignedOut);
        assert_eq!(notice.account_id, Some(4));
    }
}
