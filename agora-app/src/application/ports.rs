//! Narrow interfaces the controllers depend on. The database adapters
//! implement them in `infrastructure::db`; tests use the in-memory backend.

use crate::domain::{
    Account, AccountId, Bucket, Event, EventChanges, EventId, EventVoteSummary, EventWithOwner,
    InterestCounts, NewAccount, NewEvent, Notification, NotificationId, VoteKind,
};
use agora_errors::AppError;
use std::future::Future;

pub trait AccountStore: Send + Sync {
    fn find_by_identity(
        &self,
        identity_user_id: &str,
    ) -> impl Future<Output = Result<Option<Account>, AppError>> + Send;

    fn find_by_id(
        &self,
        id: AccountId,
    ) -> impl Future<Output = Result<Option<Account>, AppError>> + Send;

    fn insert(&self, account: NewAccount) -> impl Future<Output = Result<Account, AppError>> + Send;

    fn update_profile(
        &self,
        id: AccountId,
        full_name: String,
        image_url: Option<String>,
    ) -> impl Future<Output = Result<Account, AppError>> + Send;
}

pub trait EventStore: Send + Sync {
    /// Events ordered by creation time, newest first.
    fn list_page(
        &self,
        offset: u64,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<Event>, AppError>> + Send;

    fn list_by_owner(
        &self,
        owner: AccountId,
    ) -> impl Future<Output = Result<Vec<Event>, AppError>> + Send;

    fn get(&self, id: EventId) -> impl Future<Output = Result<Option<Event>, AppError>> + Send;

    fn get_with_owner(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<EventWithOwner>, AppError>> + Send;

    fn insert(
        &self,
        event: NewEvent,
        created_by: AccountId,
    ) -> impl Future<Output = Result<Event, AppError>> + Send;

    /// Keeps the stored image when `changes.image_url` is `None`.
    fn update(
        &self,
        id: EventId,
        changes: EventChanges,
    ) -> impl Future<Output = Result<Event, AppError>> + Send;

    /// Removes the event together with its vote memberships.
    fn delete(&self, id: EventId) -> impl Future<Output = Result<(), AppError>> + Send;
}

pub trait VoteStore: Send + Sync {
    fn count(
        &self,
        kind: VoteKind,
        event_id: EventId,
    ) -> impl Future<Output = Result<u64, AppError>> + Send;

    fn has_vote(
        &self,
        kind: VoteKind,
        event_id: EventId,
        user_id: AccountId,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Deletes the membership and decrements the matching counter.
    fn remove(
        &self,
        kind: VoteKind,
        event_id: EventId,
        user_id: AccountId,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Inserts the membership and increments the matching counter in one
    /// transaction, dropping any membership in the opposite collection.
    fn cast(
        &self,
        kind: VoteKind,
        event_id: EventId,
        user_id: AccountId,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn voters(
        &self,
        kind: VoteKind,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<AccountId>, AppError>> + Send;

    fn summaries_for_owner(
        &self,
        owner: AccountId,
    ) -> impl Future<Output = Result<Vec<EventVoteSummary>, AppError>> + Send;

    fn interest_counts(
        &self,
        user_id: AccountId,
    ) -> impl Future<Output = Result<InterestCounts, AppError>> + Send;

    fn voted_events(
        &self,
        user_id: AccountId,
        kind: VoteKind,
    ) -> impl Future<Output = Result<Vec<EventWithOwner>, AppError>> + Send;
}

pub trait NotificationStore: Send + Sync {
    /// Newest first, joined with the event's current status.
    fn list_for_user(
        &self,
        user_id: AccountId,
    ) -> impl Future<Output = Result<Vec<Notification>, AppError>> + Send;

    fn create(
        &self,
        user_id: AccountId,
        event_id: EventId,
        title: String,
        message: String,
    ) -> impl Future<Output = Result<Notification, AppError>> + Send;

    fn mark_read(
        &self,
        user_id: AccountId,
        id: NotificationId,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn mark_all_read(&self, user_id: AccountId)
        -> impl Future<Output = Result<(), AppError>> + Send;

    fn delete(
        &self,
        user_id: AccountId,
        id: NotificationId,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn delete_all(&self, user_id: AccountId) -> impl Future<Output = Result<(), AppError>> + Send;
}

pub trait ObjectStorage: Send + Sync {
    fn upload(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn public_url(&self, bucket: Bucket, path: &str) -> String;
}
