mod account;
mod dashboard;
mod event;
mod feed;
mod image;
mod notification;
mod routing;
mod session;
mod vote;

pub use account::{
    initials, Account, AccountId, EventOwner, NewAccount, Profile, RegisterProfile, Role,
    UnknownRole, UpdateProfile,
};
pub use dashboard::{DashboardView, SortDirection, StatusCounts};
pub use event::{
    Event, EventChanges, EventForm, EventId, EventStatus, EventWithOwner, NewEvent,
    UnknownStatus, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
};
pub use feed::{
    Debounced, EventFilter, FeedLoad, FeedPages, FeedTail, FeedView, StatusFilter,
    DEFAULT_PAGE_SIZE, SEARCH_DEBOUNCE_MS,
};
pub use image::{Bucket, ImageUpload, UnknownBucket, ACCEPTED_IMAGE_TYPES, MAX_FILE_SIZE};
pub use notification::{Notification, NotificationId, NotificationList, NotificationSnapshot};
pub use routing::{route_guard, RouteDecision, LANDING_PATH, REGISTER_PATH};
pub use session::{AuthEvent, AuthStatus, IdentityUser};
pub use vote::{
    EventVoteSummary, InterestCounts, OrganizerStats, VoteKind, VotePlan, VoteState, VoteStats,
};
