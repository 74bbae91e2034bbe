use crate::application::{
    ControllerRegistry, EventService, EventVoting, ImageUploader, NotificationFeed,
    NotificationTrigger, ProfileResolver, StatsService,
};
use crate::config::AgoraConfig;
use crate::domain::{AccountId, AuthEvent, EventId};
use crate::infrastructure::auth::{AuthEvents, GoogleOAuth};
use crate::infrastructure::db::{
    self, AccountRepository, EventRepository, NotificationRepository, VoteRepository,
};
use crate::infrastructure::realtime::ChangeFeed;
use crate::infrastructure::storage::LocalStorage;
use agora_errors::AppError;
use sea_orm::DatabaseConnection;
use std::sync::{Arc, Weak};

type VotingRegistry = ControllerRegistry<(EventId, Option<AccountId>), EventVoting<VoteRepository>>;
type NotificationRegistry = ControllerRegistry<AccountId, NotificationFeed<NotificationRepository>>;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AgoraConfig>,
    pub changes: ChangeFeed,
    pub profiles: ProfileResolver<AccountRepository>,
    pub events: EventService<EventRepository>,
    pub stats: StatsService<VoteRepository>,
    pub uploads: ImageUploader<LocalStorage>,
    pub oauth: GoogleOAuth,
    pub auth_events: AuthEvents,
    votes: Arc<VoteRepository>,
    notifications: Arc<NotificationRepository>,
    voting: Arc<VotingRegistry>,
    notification_feeds: Arc<NotificationRegistry>,
    _trigger: Arc<NotificationTrigger>,
}

impl AppContext {
    /// Connects to the database, applies the schema and wires every service.
    pub async fn connect(config: AgoraConfig) -> Result<Self, AppError> {
        let db = db::create_connection(&config.database_url)
            .await
            .map_err(db::db_error)?;
        db::run_migrations(&db).await.map_err(db::db_error)?;
        tracing::info!("database connected");
        Self::new(db, config)
    }

    pub fn new(db: DatabaseConnection, config: AgoraConfig) -> Result<Self, AppError> {
        let oauth = GoogleOAuth::new(
            &config.google_client_id,
            &config.google_client_secret,
            &config.google_redirect_uri,
        )?;

        let changes = ChangeFeed::default();
        let accounts = Arc::new(AccountRepository::new(db.clone()));
        let events = Arc::new(EventRepository::new(db.clone(), changes.clone()));
        let votes = Arc::new(VoteRepository::new(db.clone(), changes.clone()));
        let notifications = Arc::new(NotificationRepository::new(db, changes.clone()));
        let storage = Arc::new(LocalStorage::new(
            &config.storage_dir,
            &config.storage_public_base,
        ));

        let trigger = NotificationTrigger::spawn(
            Arc::clone(&events),
            Arc::clone(&votes),
            Arc::clone(&notifications),
            &changes,
        );

        let ctx = Self {
            config: Arc::new(config),
            profiles: ProfileResolver::new(accounts),
            events: EventService::new(events),
            stats: StatsService::new(Arc::clone(&votes)),
            uploads: ImageUploader::new(storage),
            oauth,
            auth_events: AuthEvents::default(),
            changes,
            votes,
            notifications,
            voting: Arc::new(ControllerRegistry::default()),
            notification_feeds: Arc::new(ControllerRegistry::default()),
            _trigger: Arc::new(trigger),
        };
        ctx.evict_on_sign_out();
        Ok(ctx)
    }

    /// Vote widget for the pair, shared while someone holds it. Unknown
    /// events are rejected before anything is mounted.
    pub async fn voting(
        &self,
        event_id: EventId,
        viewer: Option<AccountId>,
    ) -> Result<Arc<EventVoting<VoteRepository>>, AppError> {
        if self.voting.get(&(event_id, viewer)).is_none() {
            self.events.get(event_id).await?;
        }
        let widget = self
            .voting
            .get_or_mount((event_id, viewer), || {
                EventVoting::mount(Arc::clone(&self.votes), &self.changes, event_id, viewer)
            })
            .await;
        Ok(widget)
    }

    pub async fn notification_feed(
        &self,
        user_id: AccountId,
    ) -> Arc<NotificationFeed<NotificationRepository>> {
        self.notification_feeds
            .get_or_mount(user_id, || {
                NotificationFeed::mount(Arc::clone(&self.notifications), &self.changes, user_id)
            })
            .await
    }

    pub fn feed_page_size(&self) -> u64 {
        self.config.feed_page_size
    }

    fn evict_on_sign_out(&self) {
        let voting: Weak<VotingRegistry> = Arc::downgrade(&self.voting);
        let feeds: Weak<NotificationRegistry> = Arc::downgrade(&self.notification_feeds);
        let mut notices = self.auth_events.subscribe();

        tokio::spawn(async move {
            loop {
                let notice = match notices.recv().await {
                    Ok(notice) => notice,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "auth notices lagged");
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };
                if notice.event != AuthEvent::SignedOut {
                    continue;
                }
                let Some(account_id) = notice.account_id else {
                    continue;
                };
                let (Some(voting), Some(feeds)) = (voting.upgrade(), feeds.upgrade()) else {
                    break;
                };
                let widgets = voting.evict_where(|(_, viewer)| *viewer == Some(account_id));
                let bells = feeds.evict_where(|user| *user == account_id);
                widgets.iter().for_each(|w| w.teardown());
                bells.iter().for_each(|b| b.teardown());
                tracing::info!(
                    account_id,
                    widgets = widgets.len(),
                    bells = bells.len(),
                    "per-user controllers released"
                );
            }
        });
    }
}
