mod change_feed;

pub use change_feed::{ChangeFeed, ChangeKind, RowChange, RowFilter, Subscription};
