mod event_editor;
mod events;
mod organizer;
mod participant;
mod profile_edit;
mod register;

pub use event_editor::{EditEventPage, NewEventPage};
pub use events::EventListPage;
pub use organizer::OrganizerPage;
pub use participant::ParticipantPage;
pub use profile_edit::ProfileEditPage;
pub use register::RegisterPage;
