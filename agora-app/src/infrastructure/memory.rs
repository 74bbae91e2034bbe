//! In-memory implementation of every port, publishing to a real
//! `ChangeFeed`. Used by the controller tests.

use crate::application::ports::{
    AccountStore, EventStore, NotificationStore, ObjectStorage, VoteStore,
};
use crate::application::{EVENTS_TABLE, NOTIFICATIONS_TABLE};
use crate::domain::{
    Account, AccountId, Bucket, Event, EventChanges, EventId, EventOwner, EventVoteSummary,
    EventWithOwner, InterestCounts, NewAccount, NewEvent, Notification, NotificationId, VoteKind,
};
use crate::infrastructure::realtime::{ChangeFeed, ChangeKind, RowChange};
use agora_errors::AppError;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct State {
    next_id: i64,
    accounts: Vec<Account>,
    events: Vec<Event>,
    votes: HashMap<VoteKind, BTreeSet<(EventId, AccountId)>>,
    notifications: Vec<Notification>,
    objects: HashMap<String, Vec<u8>>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn members(&mut self, kind: VoteKind) -> &mut BTreeSet<(EventId, AccountId)> {
        self.votes.entry(kind).or_default()
    }

    fn count(&self, kind: VoteKind, event_id: EventId) -> u64 {
        self.votes
            .get(&kind)
            .map_or(0, |m| m.iter().filter(|(e, _)| *e == event_id).count() as u64)
    }

    fn with_owner(&self, event: &Event) -> EventWithOwner {
        EventWithOwner {
            event: event.clone(),
            owner: self
                .accounts
                .iter()
                .find(|a| a.id == event.created_by)
                .map(EventOwner::from),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
    failing: Arc<Mutex<HashSet<&'static str>>>,
    changes: ChangeFeed,
}

impl MemoryBackend {
    pub fn new(changes: ChangeFeed) -> Self {
        Self {
            changes,
            ..Self::default()
        }
    }

    pub fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    /// Makes every call to `op` fail until `recover(op)`.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Yields once so concurrent callers interleave like real round trips.
    async fn hop(&self, op: &'static str) -> Result<(), AppError> {
        tokio::task::yield_now().await;
        if self.failing.lock().unwrap().contains(op) {
            return Err(AppError::Database(format!("{op} unavailable")));
        }
        Ok(())
    }

    fn publish_vote(&self, kind: VoteKind, change: ChangeKind, event_id: EventId, user_id: AccountId) {
        self.changes.publish(
            RowChange::new(kind.table(), change)
                .with("event_id", event_id)
                .with("user_id", user_id),
        );
    }

    pub fn seed_account(&self, account: NewAccount) -> Account {
        let mut state = self.state();
        let account = Account {
            id: state.next_id(),
            identity_user_id: account.identity_user_id,
            full_name: account.full_name,
            image_url: account.image_url,
            role: account.role,
        };
        state.accounts.push(account.clone());
        account
    }

    pub fn seed_event(&self, event: NewEvent, created_by: AccountId) -> Event {
        let mut state = self.state();
        let id = state.next_id();
        let event = new_event_row(id, event, created_by);
        state.events.push(event.clone());
        event
    }

    /// Adds a membership without touching the other collection, for
    /// reproducing corrupted data.
    pub fn seed_vote(&self, kind: VoteKind, event_id: EventId, user_id: AccountId) {
        self.state().members(kind).insert((event_id, user_id));
    }

    pub fn object(&self, bucket: Bucket, path: &str) -> Option<Vec<u8>> {
        self.state()
            .objects
            .get(&format!("{}/{}", bucket.name(), path))
            .cloned()
    }
}

fn new_event_row(id: EventId, event: NewEvent, created_by: AccountId) -> Event {
    Event {
        id,
        title: event.title,
        description: event.description,
        contact: event.contact,
        status: event.status,
        start_date: event.start_date,
        end_date: event.end_date,
        location: event.location,
        image_url: event.image_url,
        created_by,
        // ids grow with insertion order, keep created_at consistent with it
        created_at: Utc::now() + chrono::Duration::milliseconds(id),
    }
}

impl AccountStore for MemoryBackend {
    async fn find_by_identity(&self, identity_user_id: &str) -> Result<Option<Account>, AppError> {
        self.hop("find_account").await?;
        Ok(self
            .state()
            .accounts
            .iter()
            .find(|a| a.identity_user_id == identity_user_id)
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, AppError> {
        self.hop("find_account").await?;
        Ok(self.state().accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, AppError> {
        self.hop("insert_account").await?;
        if self
            .state()
            .accounts
            .iter()
            .any(|a| a.identity_user_id == account.identity_user_id)
        {
            return Err(AppError::Conflict("duplicate identity".to_string()));
        }
        Ok(self.seed_account(account))
    }

    async fn update_profile(
        &self,
        id: AccountId,
        full_name: String,
        image_url: Option<String>,
    ) -> Result<Account, AppError> {
        self.hop("update_account").await?;
        let mut state = self.state();
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound("Compte".to_string()))?;
        account.full_name = full_name;
        if image_url.is_some() {
            account.image_url = image_url;
        }
        Ok(account.clone())
    }
}

impl EventStore for MemoryBackend {
    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<Event>, AppError> {
        self.hop("list_events").await?;
        let mut events = self.state().events.clone();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_by_owner(&self, owner: AccountId) -> Result<Vec<Event>, AppError> {
        self.hop("list_events").await?;
        let mut events: Vec<Event> = self
            .state()
            .events
            .iter()
            .filter(|e| e.created_by == owner)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    async fn get(&self, id: EventId) -> Result<Option<Event>, AppError> {
        self.hop("get_event").await?;
        Ok(self.state().events.iter().find(|e| e.id == id).cloned())
    }

    async fn get_with_owner(&self, id: EventId) -> Result<Option<EventWithOwner>, AppError> {
        self.hop("get_event").await?;
        let state = self.state();
        Ok(state
            .events
            .iter()
            .find(|e| e.id == id)
            .map(|e| state.with_owner(e)))
    }

    async fn insert(&self, event: NewEvent, created_by: AccountId) -> Result<Event, AppError> {
        self.hop("insert_event").await?;
        let event = self.seed_event(event, created_by);
        self.changes.publish(
            RowChange::new(EVENTS_TABLE, ChangeKind::Insert)
                .with("id", event.id)
                .with("created_by", created_by),
        );
        Ok(event)
    }

    async fn update(&self, id: EventId, changes: EventChanges) -> Result<Event, AppError> {
        self.hop("update_event").await?;
        let updated = {
            let mut state = self.state();
            let event = state
                .events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| AppError::NotFound("Événement".to_string()))?;
            event.title = changes.title;
            event.description = changes.description;
            event.contact = changes.contact;
            event.status = changes.status;
            event.start_date = changes.start_date;
            event.end_date = changes.end_date;
            event.location = changes.location;
            if changes.image_url.is_some() {
                event.image_url = changes.image_url;
            }
            event.clone()
        };
        self.changes.publish(
            RowChange::new(EVENTS_TABLE, ChangeKind::Update)
                .with("id", id)
                .with("created_by", updated.created_by),
        );
        Ok(updated)
    }

    async fn delete(&self, id: EventId) -> Result<(), AppError> {
        self.hop("delete_event").await?;
        let (removed_votes, created_by) = {
            let mut state = self.state();
            let mut removed = Vec::new();
            for kind in VoteKind::ALL {
                state.members(kind).retain(|(event_id, user_id)| {
                    if *event_id == id {
                        removed.push((kind, *user_id));
                        false
                    } else {
                        true
                    }
                });
            }
            let position = state
                .events
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| AppError::NotFound("Événement".to_string()))?;
            let event = state.events.remove(position);
            (removed, event.created_by)
        };
        for (kind, user_id) in removed_votes {
            self.publish_vote(kind, ChangeKind::Delete, id, user_id);
        }
        self.changes.publish(
            RowChange::new(EVENTS_TABLE, ChangeKind::Delete)
                .with("id", id)
                .with("created_by", created_by),
        );
        Ok(())
    }
}

impl VoteStore for MemoryBackend {
    async fn count(&self, kind: VoteKind, event_id: EventId) -> Result<u64, AppError> {
        self.hop("count").await?;
        Ok(self.state().count(kind, event_id))
    }

    async fn has_vote(
        &self,
        kind: VoteKind,
        event_id: EventId,
        user_id: AccountId,
    ) -> Result<bool, AppError> {
        self.hop("has_vote").await?;
        Ok(self.state().members(kind).contains(&(event_id, user_id)))
    }

    async fn remove(
        &self,
        kind: VoteKind,
        event_id: EventId,
        user_id: AccountId,
    ) -> Result<(), AppError> {
        self.hop("remove").await?;
        let removed = self.state().members(kind).remove(&(event_id, user_id));
        if removed {
            self.publish_vote(kind, ChangeKind::Delete, event_id, user_id);
        }
        Ok(())
    }

    async fn cast(
        &self,
        kind: VoteKind,
        event_id: EventId,
        user_id: AccountId,
    ) -> Result<(), AppError> {
        self.hop("cast").await?;
        let (dropped, inserted) = {
            let mut state = self.state();
            let dropped = state.members(kind.opposite()).remove(&(event_id, user_id));
            let inserted = state.members(kind).insert((event_id, user_id));
            (dropped, inserted)
        };
        if dropped {
            self.publish_vote(kind.opposite(), ChangeKind::Delete, event_id, user_id);
        }
        if inserted {
            self.publish_vote(kind, ChangeKind::Insert, event_id, user_id);
        }
        Ok(())
    }

    async fn voters(&self, kind: VoteKind, event_id: EventId) -> Result<Vec<AccountId>, AppError> {
        self.hop("voters").await?;
        Ok(self
            .state()
            .members(kind)
            .iter()
            .filter(|(e, _)| *e == event_id)
            .map(|(_, u)| *u)
            .collect())
    }

    async fn summaries_for_owner(
        &self,
        owner: AccountId,
    ) -> Result<Vec<EventVoteSummary>, AppError> {
        self.hop("summaries").await?;
        let state = self.state();
        Ok(state
            .events
            .iter()
            .filter(|e| e.created_by == owner)
            .map(|e| EventVoteSummary {
                event_id: e.id,
                title: e.title.clone(),
                interests: state.count(VoteKind::Interested, e.id),
                no_interests: state.count(VoteKind::NotInterested, e.id),
            })
            .collect())
    }

    async fn interest_counts(&self, user_id: AccountId) -> Result<InterestCounts, AppError> {
        self.hop("interest_counts").await?;
        let mut state = self.state();
        let interested = state
            .members(VoteKind::Interested)
            .iter()
            .filter(|(_, u)| *u == user_id)
            .count() as u64;
        let not_interested = state
            .members(VoteKind::NotInterested)
            .iter()
            .filter(|(_, u)| *u == user_id)
            .count() as u64;
        Ok(InterestCounts {
            user_id,
            interested,
            not_interested,
        })
    }

    async fn voted_events(
        &self,
        user_id: AccountId,
        kind: VoteKind,
    ) -> Result<Vec<EventWithOwner>, AppError> {
        self.hop("voted_events").await?;
        let mut state = self.state();
        let ids: Vec<EventId> = state
            .members(kind)
            .iter()
            .filter(|(_, u)| *u == user_id)
            .map(|(e, _)| *e)
            .collect();
        Ok(state
            .events
            .iter()
            .filter(|e| ids.contains(&e.id))
            .map(|e| state.with_owner(e))
            .collect())
    }
}

impl NotificationStore for MemoryBackend {
    async fn list_for_user(&self, user_id: AccountId) -> Result<Vec<Notification>, AppError> {
        self.hop("list_notifications").await?;
        let state = self.state();
        let mut list: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .map(|n| Notification {
                event_status: state
                    .events
                    .iter()
                    .find(|e| e.id == n.event_id)
                    .map(|e| e.status),
                ..n.clone()
            })
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(list)
    }

    async fn create(
        &self,
        user_id: AccountId,
        event_id: EventId,
        title: String,
        message: String,
    ) -> Result<Notification, AppError> {
        self.hop("create_notification").await?;
        let notification = {
            let mut state = self.state();
            let notification = Notification {
                id: state.next_id(),
                user_id,
                event_id,
                title,
                message,
                is_read: false,
                created_at: Utc::now(),
                event_status: None,
            };
            state.notifications.push(notification.clone());
            notification
        };
        self.changes.publish(
            RowChange::new(NOTIFICATIONS_TABLE, ChangeKind::Insert)
                .with("id", notification.id)
                .with("user_id", user_id),
        );
        Ok(notification)
    }

    async fn mark_read(&self, user_id: AccountId, id: NotificationId) -> Result<(), AppError> {
        self.hop("mark_read").await?;
        if let Some(n) = self
            .state()
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            n.is_read = true;
        }
        self.changes.publish(
            RowChange::new(NOTIFICATIONS_TABLE, ChangeKind::Update)
                .with("id", id)
                .with("user_id", user_id),
        );
        Ok(())
    }

    async fn mark_all_read(&self, user_id: AccountId) -> Result<(), AppError> {
        self.hop("mark_all_read").await?;
        for n in self
            .state()
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id)
        {
            n.is_read = true;
        }
        self.changes
            .publish(RowChange::new(NOTIFICATIONS_TABLE, ChangeKind::Update).with("user_id", user_id));
        Ok(())
    }

    async fn delete(&self, user_id: AccountId, id: NotificationId) -> Result<(), AppError> {
        self.hop("delete_notification").await?;
        self.state()
            .notifications
            .retain(|n| !(n.id == id && n.user_id == user_id));
        self.changes.publish(
            RowChange::new(NOTIFICATIONS_TABLE, ChangeKind::Delete)
                .with("id", id)
                .with("user_id", user_id),
        );
        Ok(())
    }

    async fn delete_all(&self, user_id: AccountId) -> Result<(), AppError> {
        self.hop("delete_all_notifications").await?;
        self.state().notifications.retain(|n| n.user_id != user_id);
        self.changes
            .publish(RowChange::new(NOTIFICATIONS_TABLE, ChangeKind::Delete).with("user_id", user_id));
        Ok(())
    }
}

impl ObjectStorage for MemoryBackend {
    async fn upload(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), AppError> {
        self.hop("upload").await?;
        self.state()
            .objects
            .insert(format!("{}/{}", bucket.name(), path), bytes);
        Ok(())
    }

    fn public_url(&self, bucket: Bucket, path: &str) -> String {
        format!("/storage/{}/{}", bucket.name(), path)
    }
}
