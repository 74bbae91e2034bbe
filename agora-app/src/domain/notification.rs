use super::account::AccountId;
use super::event::{EventId, EventStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type NotificationId = i64;

/// Created by the server when an event changes; clients only read, mark
/// and delete them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: AccountId,
    pub event_id: EventId,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    /// Status of the joined event at read time, `None` once it is gone.
    pub event_status: Option<EventStatus>,
}

impl Notification {
    pub fn status_label(&self) -> &'static str {
        self.event_status.map_or("pending", |s| s.as_str())
    }
}

/// Locally cached notification list with the optimistic patches applied
/// while the matching remote call is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationList {
    items: Vec<Notification>,
}

impl NotificationList {
    pub fn new(items: Vec<Notification>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    pub fn replace(&mut self, items: Vec<Notification>) {
        self.items = items;
    }

    pub fn mark_read(&mut self, id: NotificationId) {
        if let Some(n) = self.items.iter_mut().find(|n| n.id == id) {
            n.is_read = true;
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.is_read = true;
        }
    }

    pub fn remove(&mut self, id: NotificationId) {
        self.items.retain(|n| n.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Snapshot pushed to realtime subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSnapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

impl From<&NotificationList> for NotificationSnapshot {
    fn from(list: &NotificationList) -> Self {
        Self {
            notifications: list.items().to_vec(),
            unread_count: list.unread_count(),
        }
    }
}
