pub mod account;
pub mod event;
pub mod notification;
pub mod user_interest;
pub mod user_no_interest;

pub use account::Entity as Account;
pub use event::Entity as Event;
pub use notification::Entity as Notification;
pub use user_interest::Entity as UserInterest;
pub use user_no_interest::Entity as UserNoInterest;
