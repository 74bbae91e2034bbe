pub mod ports;

mod event_voting;
mod events;
mod notification_feed;
mod notification_trigger;
mod profile;
mod registry;
mod stats;
mod uploads;

pub use event_voting::{EventVoting, VoteAttempt};
pub use events::EventService;
pub use notification_feed::{NotificationFeed, NOTIFICATIONS_TABLE};
pub use notification_trigger::{notify_interested, update_message, NotificationTrigger, EVENTS_TABLE};
pub use profile::ProfileResolver;
pub use registry::ControllerRegistry;
pub use stats::StatsService;
pub use uploads::ImageUploader;
