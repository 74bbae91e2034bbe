use super::ports::EventStore;
use crate::domain::{
    DashboardView, Event, EventChanges, EventForm, EventId, EventWithOwner, Profile, Role,
};
use agora_errors::AppError;
use chrono::NaiveDate;
use std::sync::Arc;

/// Event CRUD with the organizer/owner rules applied.
pub struct EventService<S: EventStore> {
    store: Arc<S>,
}

impl<S: EventStore> Clone for EventService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EventStore> EventService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn page(&self, offset: u64, limit: u64) -> Result<Vec<Event>, AppError> {
        self.store.list_page(offset, limit).await
    }

    pub async fn get(&self, id: EventId) -> Result<EventWithOwner, AppError> {
        self.store
            .get_with_owner(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Événement".to_string()))
    }

    pub async fn create(
        &self,
        author: &Profile,
        form: EventForm,
        today: NaiveDate,
    ) -> Result<Event, AppError> {
        require_organizer(author)?;
        let event = form.validate(today)?;
        let created = self.store.insert(event, author.user_id()).await?;
        tracing::info!(event_id = created.id, created_by = author.user_id(), "event created");
        Ok(created)
    }

    /// `form.image_url` of `None` keeps the current image. Events that have
    /// already started stay editable.
    pub async fn update(
        &self,
        author: &Profile,
        id: EventId,
        form: EventForm,
    ) -> Result<Event, AppError> {
        self.owned(author, id).await?;
        let changes = EventChanges::from(form.validate_edit()?);
        let updated = self.store.update(id, changes).await?;
        tracing::info!(event_id = id, status = %updated.status, "event updated");
        Ok(updated)
    }

    pub async fn delete(&self, author: &Profile, id: EventId) -> Result<(), AppError> {
        self.owned(author, id).await?;
        self.store.delete(id).await?;
        tracing::info!(event_id = id, "event deleted");
        Ok(())
    }

    pub async fn dashboard(&self, author: &Profile) -> Result<DashboardView, AppError> {
        require_organizer(author)?;
        let events = self.store.list_by_owner(author.user_id()).await?;
        Ok(DashboardView::new(events))
    }

    async fn owned(&self, author: &Profile, id: EventId) -> Result<Event, AppError> {
        require_organizer(author)?;
        let event = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Événement".to_string()))?;
        if event.created_by != author.user_id() {
            return Err(AppError::Forbidden(format!(
                "event {} belongs to account {}",
                id, event.created_by
            )));
        }
        Ok(event)
    }
}

pub(crate) fn require_organizer(profile: &Profile) -> Result<(), AppError> {
    match profile.role() {
        Role::Organizer => Ok(()),
        Role::Participant => Err(AppError::Forbidden(
            "organizer role required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::VoteStore;
    use crate::domain::{
        Account, EventStatus, FeedPages, NewAccount, NewEvent, SortDirection, StatusFilter,
        VoteKind, DEFAULT_PAGE_SIZE,
    };
    use crate::infrastructure::memory::MemoryBackend;
    use crate::infrastructure::realtime::ChangeFeed;
    use chrono::{Duration, Utc};

    struct Fixture {
        backend: Arc<MemoryBackend>,
        service: EventService<MemoryBackend>,
    }

    impl Fixture {
        fn new() -> Self {
            let backend = Arc::new(MemoryBackend::new(ChangeFeed::default()));
            Self {
                service: EventService::new(Arc::clone(&backend)),
                backend,
            }
        }

        fn profile(&self, name: &str, role: Role) -> Profile {
            let account: Account = self.backend.seed_account(NewAccount {
                identity_user_id: format!("google-{name}"),
                full_name: name.to_string(),
                image_url: None,
                role,
            });
            Profile::new(account, format!("{name}@univ.fr"))
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn form(title: &str, status: EventStatus, in_days: i64) -> EventForm {
        let start = Utc::now() + Duration::days(in_days);
        EventForm {
            title: title.to_string(),
            description: "Présentation".to_string(),
            contact: "contact@univ.fr".to_string(),
            location: "Amphi A".to_string(),
            status: Some(status),
            start_date: Some(start),
            end_date: Some(start + Duration::hours(2)),
            image_url: Some("/storage/events/event-images/a.png".to_string()),
        }
    }

    #[tokio::test]
    async fn test_feed_stops_after_short_page() {
        let fx = Fixture::new();
        let orga = fx.profile("olga", Role::Organizer);
        for i in 0..5 {
            fx.service
                .create(&orga, form(&format!("Atelier {i}"), EventStatus::Official, i + 1), today())
                .await
                .unwrap();
        }

        let mut feed = FeedPages::new(DEFAULT_PAGE_SIZE);
        let mut fetches = 0;
        while let Some(offset) = feed.next_offset() {
            feed.push_page(fx.service.page(offset, feed.page_size()).await.unwrap());
            fetches += 1;
        }
        assert_eq!(fetches, 2);
        assert_eq!(feed.loaded(), 5);
        assert!(!feed.has_next_page());

        // pages come newest first
        let first: Vec<String> = feed.pages()[0].iter().map(|e| e.title.clone()).collect();
        assert_eq!(first, vec!["Atelier 4", "Atelier 3", "Atelier 2"]);
    }

    #[tokio::test]
    async fn test_participant_cannot_create() {
        let fx = Fixture::new();
        let participant = fx.profile("paul", Role::Participant);
        let err = fx
            .service
            .create(&participant, form("Soirée", EventStatus::Draft, 1), today())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_store() {
        let fx = Fixture::new();
        let orga = fx.profile("olga", Role::Organizer);
        let mut bad = form("", EventStatus::Draft, 1);
        bad.contact.clear();
        let err = fx.service.create(&orga, bad, today()).await.unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert!(errors.get("title").is_some());
                assert!(errors.get("contact").is_some());
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(fx.service.page(0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_image_without_new_upload() {
        let fx = Fixture::new();
        let orga = fx.profile("olga", Role::Organizer);
        let event = fx
            .service
            .create(&orga, form("Conférence", EventStatus::Draft, 3), today())
            .await
            .unwrap();

        let mut edit = form("Conférence (salle changée)", EventStatus::Official, 3);
        edit.image_url = None;
        let updated = fx.service.update(&orga, event.id, edit).await.unwrap();
        assert_eq!(updated.status, EventStatus::Official);
        assert_eq!(updated.image_url, event.image_url);
    }

    #[tokio::test]
    async fn test_started_event_can_be_made_official() {
        let fx = Fixture::new();
        let orga = fx.profile("olga", Role::Organizer);
        let start = Utc::now() - Duration::days(2);
        let event = fx.backend.seed_event(
            NewEvent {
                title: "Colloque".to_string(),
                description: "Trois jours".to_string(),
                contact: "colloque@univ.fr".to_string(),
                status: EventStatus::Draft,
                start_date: start,
                end_date: start + Duration::days(3),
                location: Some("Amphi C".to_string()),
                image_url: None,
            },
            orga.user_id(),
        );

        let mut edit = form("Colloque", EventStatus::Official, -2);
        edit.start_date = Some(start);
        edit.end_date = Some(start + Duration::days(3));
        let updated = fx.service.update(&orga, event.id, edit).await.unwrap();
        assert_eq!(updated.status, EventStatus::Official);
        assert_eq!(updated.start_date, start);
    }

    #[tokio::test]
    async fn test_only_owner_can_edit_or_delete() {
        let fx = Fixture::new();
        let owner = fx.profile("olga", Role::Organizer);
        let rival = fx.profile("oscar", Role::Organizer);
        let event = fx
            .service
            .create(&owner, form("Forum", EventStatus::Draft, 2), today())
            .await
            .unwrap();

        let err = fx
            .service
            .update(&rival, event.id, form("Forum", EventStatus::Official, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(matches!(
            fx.service.delete(&rival, event.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            fx.service.delete(&owner, 9999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_votes() {
        let fx = Fixture::new();
        let owner = fx.profile("olga", Role::Organizer);
        let voter = fx.profile("vera", Role::Participant);
        let event = fx
            .service
            .create(&owner, form("Gala", EventStatus::Official, 5), today())
            .await
            .unwrap();
        fx.backend
            .cast(VoteKind::Interested, event.id, voter.user_id())
            .await
            .unwrap();

        fx.service.delete(&owner, event.id).await.unwrap();
        assert_eq!(
            fx.backend.count(VoteKind::Interested, event.id).await.unwrap(),
            0
        );
        assert!(matches!(
            fx.service.get(event.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_dashboard_lists_own_events() {
        let fx = Fixture::new();
        let owner = fx.profile("olga", Role::Organizer);
        let other = fx.profile("oscar", Role::Organizer);
        for (title, status, days) in [
            ("A", EventStatus::Draft, 4),
            ("B", EventStatus::Official, 1),
            ("C", EventStatus::Official, 9),
        ] {
            fx.service
                .create(&owner, form(title, status, days), today())
                .await
                .unwrap();
        }
        fx.service
            .create(&other, form("X", EventStatus::Draft, 2), today())
            .await
            .unwrap();

        let dashboard = fx.service.dashboard(&owner).await.unwrap();
        assert_eq!(dashboard.counts().total, 3);
        assert_eq!(dashboard.counts().official, 2);
        let titles: Vec<String> = dashboard
            .visible(StatusFilter::All, SortDirection::Asc)
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["B", "A", "C"]);
    }
}
