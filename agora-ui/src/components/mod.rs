mod error_display;
mod event_card;
mod event_voting;
mod loading_spinner;
mod notification_bell;

pub use error_display::{ErrorDisplay, FieldMessage};
pub use event_card::{EventCard, StatusBadge};
pub use event_voting::EventVoting;
pub use loading_spinner::LoadingSpinner;
pub use notification_bell::NotificationBell;
