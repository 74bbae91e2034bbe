use super::ports::NotificationStore;
use crate::domain::{AccountId, Notification, NotificationId, NotificationList};
use crate::infrastructure::realtime::{ChangeFeed, RowFilter};
use agora_errors::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const NOTIFICATIONS_TABLE: &str = "notifications";

struct Shared<S> {
    store: Arc<S>,
    user_id: AccountId,
    list: watch::Sender<NotificationList>,
    torn_down: AtomicBool,
}

impl<S: NotificationStore> Shared<S> {
    async fn refetch(&self) -> Result<(), AppError> {
        let items = self.store.list_for_user(self.user_id).await?;
        if !self.torn_down.load(Ordering::Acquire) {
            self.list.send_modify(|list| list.replace(items));
        }
        Ok(())
    }

    fn patch(&self, f: impl FnOnce(&mut NotificationList)) {
        self.list.send_modify(f);
    }

    /// Failed mutations leave the optimistic patch in place; an immediate
    /// refetch brings the cache back to what the store holds.
    async fn settle(&self, op: &str, result: Result<(), AppError>) -> Result<(), AppError> {
        if let Err(e) = result {
            tracing::error!(user_id = self.user_id, "notification {} failed: {}", op, e);
            if let Err(refetch) = self.refetch().await {
                tracing::error!(user_id = self.user_id, "notification refetch failed: {}", refetch);
            }
            return Err(e);
        }
        Ok(())
    }
}

/// Cached notification list of one account, kept fresh by the change feed.
pub struct NotificationFeed<S: NotificationStore + 'static> {
    shared: Arc<Shared<S>>,
    task: JoinHandle<()>,
}

impl<S: NotificationStore + 'static> NotificationFeed<S> {
    pub async fn mount(store: Arc<S>, changes: &ChangeFeed, user_id: AccountId) -> Self {
        let (list, _) = watch::channel(NotificationList::default());
        let shared = Arc::new(Shared {
            store,
            user_id,
            list,
            torn_down: AtomicBool::new(false),
        });

        let mut subscription =
            changes.subscribe(NOTIFICATIONS_TABLE, Some(RowFilter::eq("user_id", user_id)));
        let task_shared = Arc::clone(&shared);
        let task = tokio::spawn(async move {
            while let Some(change) = subscription.next().await {
                tracing::debug!(user_id, kind = ?change.kind, "notification change received");
                if let Err(e) = task_shared.refetch().await {
                    tracing::error!(user_id, "notification refetch failed: {}", e);
                }
            }
        });

        let feed = Self { shared, task };
        if let Err(e) = feed.shared.refetch().await {
            tracing::error!(user_id, "failed to load notifications: {}", e);
        }
        feed
    }

    pub fn user_id(&self) -> AccountId {
        self.shared.user_id
    }

    pub fn list(&self) -> Vec<Notification> {
        self.shared.list.borrow().items().to_vec()
    }

    pub fn unread_count(&self) -> usize {
        self.shared.list.borrow().unread_count()
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationList> {
        self.shared.list.subscribe()
    }

    pub async fn refetch(&self) -> Result<(), AppError> {
        self.shared.refetch().await
    }

    pub async fn mark_read(&self, id: NotificationId) -> Result<(), AppError> {
        self.shared.patch(|list| list.mark_read(id));
        let result = self.shared.store.mark_read(self.shared.user_id, id).await;
        self.shared.settle("mark_read", result).await
    }

    pub async fn mark_all_read(&self) -> Result<(), AppError> {
        self.shared.patch(NotificationList::mark_all_read);
        let result = self.shared.store.mark_all_read(self.shared.user_id).await;
        self.shared.settle("mark_all_read", result).await
    }

    pub async fn delete(&self, id: NotificationId) -> Result<(), AppError> {
        self.shared.patch(|list| list.remove(id));
        let result = self.shared.store.delete(self.shared.user_id, id).await;
        self.shared.settle("delete", result).await
    }

    pub async fn delete_all(&self) -> Result<(), AppError> {
        self.shared.patch(NotificationList::clear);
        let result = self.shared.store.delete_all(self.shared.user_id).await;
        self.shared.settle("delete_all", result).await
    }

    pub fn teardown(&self) {
        self.shared.torn_down.store(true, Ordering::Release);
        self.task.abort();
    }
}

impl<S: NotificationStore + 'static> Drop for NotificationFeed<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
