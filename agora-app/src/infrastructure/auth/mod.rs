mod auth_events;
mod google_oauth;
mod session;

pub use auth_events::{AuthEvents, AuthNotice};
pub use google_oauth::GoogleOAuth;
pub use session::{IdentitySession, OAuthState};
