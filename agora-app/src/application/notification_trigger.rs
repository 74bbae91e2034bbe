use super::ports::{EventStore, NotificationStore, VoteStore};
use crate::domain::{EventId, EventStatus, VoteKind};
use crate::infrastructure::realtime::{ChangeFeed, ChangeKind};
use agora_errors::AppError;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const EVENTS_TABLE: &str = "events";

/// Server-side reaction to event updates: every account interested in the
/// event gets a notification. Clients never create notifications.
pub struct NotificationTrigger {
    task: JoinHandle<()>,
}

impl NotificationTrigger {
    pub fn spawn<E, V, N>(events: Arc<E>, votes: Arc<V>, notifications: Arc<N>, changes: &ChangeFeed) -> Self
    where
        E: EventStore + 'static,
        V: VoteStore + 'static,
        N: NotificationStore + 'static,
    {
        let mut subscription = changes.subscribe(EVENTS_TABLE, None);
        let task = tokio::spawn(async move {
            while let Some(change) = subscription.next().await {
                if change.kind != ChangeKind::Update {
                    continue;
                }
                let Some(event_id) = change.column("id") else {
                    tracing::warn!("event update without id, skipping notifications");
                    continue;
                };
                match notify_interested(&*events, &*votes, &*notifications, event_id).await {
                    Ok(sent) => tracing::info!(event_id, sent, "event update notifications sent"),
                    Err(e) => tracing::error!(event_id, "failed to notify interested users: {}", e),
                }
            }
        });
        Self { task }
    }
}

impl Drop for NotificationTrigger {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn update_message(title: &str, status: EventStatus) -> String {
    match status {
        EventStatus::Official => format!("L'événement « {title} » est maintenant officiel."),
        EventStatus::Draft => format!("L'événement « {title} » a été modifié et n'est plus officiel."),
    }
}

pub async fn notify_interested<E, V, N>(
    events: &E,
    votes: &V,
    notifications: &N,
    event_id: EventId,
) -> Result<usize, AppError>
where
    E: EventStore,
    V: VoteStore,
    N: NotificationStore,
{
    let Some(event) = events.get(event_id).await? else {
        return Ok(0);
    };
    let message = update_message(&event.title, event.status);
    let recipients = votes.voters(VoteKind::Interested, event_id).await?;
    for user_id in &recipients {
        notifications
            .create(*user_id, event_id, event.title.clone(), message.clone())
            .await?;
    }
    Ok(recipients.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::NotificationFeed;
    use crate::domain::{EventChanges, NewAccount, NewEvent, Role};
    use crate::infrastructure::memory::MemoryBackend;
    use chrono::{Duration, Utc};
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn test_update_notifies_interested_users_only() {
        let backend = Arc::new(MemoryBackend::new(ChangeFeed::default()));
        let account = |name: &str, role| {
            backend.seed_account(NewAccount {
                identity_user_id: format!("google-{name}"),
                full_name: name.to_string(),
                image_url: None,
                role,
            })
        };
        let orga = account("olga", Role::Organizer);
        let fan = account("fanny", Role::Participant);
        let skeptic = account("sam", Role::Participant);

        let start = Utc::now() + Duration::days(3);
        let draft = NewEvent {
            title: "Hackathon".to_string(),
            description: "48h".to_string(),
            contact: "hack@univ.fr".to_string(),
            status: EventStatus::Draft,
            start_date: start,
            end_date: start + Duration::days(2),
            location: Some("FabLab".to_string()),
            image_url: None,
        };
        let event = backend.seed_event(draft.clone(), orga.id);
        backend.cast(VoteKind::Interested, event.id, fan.id).await.unwrap();
        backend.cast(VoteKind::NotInterested, event.id, skeptic.id).await.unwrap();

        let _trigger = NotificationTrigger::spawn(
            Arc::clone(&backend),
            Arc::clone(&backend),
            Arc::clone(&backend),
            backend.changes(),
        );
        let fan_feed = NotificationFeed::mount(Arc::clone(&backend), backend.changes(), fan.id).await;
        let mut rx = fan_feed.subscribe();

        let mut changes = EventChanges::from(draft);
        changes.status = EventStatus::Official;
        backend.update(event.id, changes).await.unwrap();

        tokio::time::timeout(StdDuration::from_secs(2), rx.wait_for(|l| l.len() == 1))
            .await
            .expect("no notification delivered")
            .unwrap();
        let received = fan_feed.list();
        assert_eq!(received[0].title, "Hackathon");
        assert_eq!(received[0].event_status, Some(EventStatus::Official));
        assert!(received[0].message.contains("officiel"));

        assert!(backend.list_for_user(skeptic.id).await.unwrap().is_empty());
    }
}
