use super::db_error;
use super::entities::{account, event, user_interest, user_no_interest};
use super::entities::{Account as AccountEntity, Event as EventEntity, UserInterest, UserNoInterest};
use crate::application::ports::EventStore;
use crate::application::EVENTS_TABLE;
use crate::domain::{
    Account, AccountId, Event, EventChanges, EventId, EventOwner, EventStatus, EventWithOwner,
    NewEvent, VoteKind,
};
use crate::infrastructure::realtime::{ChangeFeed, ChangeKind, RowChange};
use agora_errors::AppError;
use sea_orm::{entity::*, query::*, DatabaseConnection, TransactionTrait};

#[derive(Clone)]
pub struct EventRepository {
    db: DatabaseConnection,
    changes: ChangeFeed,
}

impl EventRepository {
    pub fn new(db: DatabaseConnection, changes: ChangeFeed) -> Self {
        Self { db, changes }
    }

    fn publish(&self, kind: ChangeKind, event: &Event) {
        self.changes.publish(
            RowChange::new(EVENTS_TABLE, kind)
                .with("id", event.id)
                .with("created_by", event.created_by),
        );
    }
}

impl TryFrom<event::Model> for Event {
    type Error = AppError;

    fn try_from(model: event::Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse::<EventStatus>()
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(Self {
            id: model.id,
            title: model.title,
            description: model.description,
            contact: model.contact,
            status,
            start_date: model.start_date,
            end_date: model.end_date,
            location: model.location,
            image_url: model.image_url,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}

pub(super) fn with_owner(
    (event, owner): (event::Model, Option<account::Model>),
) -> Result<EventWithOwner, AppError> {
    let owner = owner
        .map(Account::try_from)
        .transpose()?
        .map(|account| EventOwner::from(&account));
    Ok(EventWithOwner {
        event: event.try_into()?,
        owner,
    })
}

fn to_events(models: Vec<event::Model>) -> Result<Vec<Event>, AppError> {
    models.into_iter().map(Event::try_from).collect()
}

impl EventStore for EventRepository {
    async fn list_page(&self, offset: u64, limit: u64) -> Result<Vec<Event>, AppError> {
        let models = EventEntity::find()
            .order_by_desc(event::Column::CreatedAt)
            .order_by_desc(event::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        to_events(models)
    }

    async fn list_by_owner(&self, owner: AccountId) -> Result<Vec<Event>, AppError> {
        let models = EventEntity::find()
            .filter(event::Column::CreatedBy.eq(owner))
            .order_by_desc(event::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        to_events(models)
    }

    async fn get(&self, id: EventId) -> Result<Option<Event>, AppError> {
        EventEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(Event::try_from)
            .transpose()
    }

    async fn get_with_owner(&self, id: EventId) -> Result<Option<EventWithOwner>, AppError> {
        EventEntity::find_by_id(id)
            .find_also_related(AccountEntity)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(with_owner)
            .transpose()
    }

    async fn insert(&self, new_event: NewEvent, created_by: AccountId) -> Result<Event, AppError> {
        let active = event::ActiveModel {
            title: Set(new_event.title),
            description: Set(new_event.description),
            contact: Set(new_event.contact),
            status: Set(new_event.status.as_str().to_string()),
            start_date: Set(new_event.start_date),
            end_date: Set(new_event.end_date),
            location: Set(new_event.location),
            image_url: Set(new_event.image_url),
            interests_count: Set(0),
            no_interests_count: Set(0),
            created_by: Set(created_by),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        let created: Event = active.insert(&self.db).await.map_err(db_error)?.try_into()?;
        self.publish(ChangeKind::Insert, &created);
        Ok(created)
    }

    async fn update(&self, id: EventId, changes: EventChanges) -> Result<Event, AppError> {
        let existing = EventEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or_else(|| AppError::NotFound("Événement".to_string()))?;

        let mut active: event::ActiveModel = existing.into();
        active.title = Set(changes.title);
        active.description = Set(changes.description);
        active.contact = Set(changes.contact);
        active.status = Set(changes.status.as_str().to_string());
        active.start_date = Set(changes.start_date);
        active.end_date = Set(changes.end_date);
        active.location = Set(changes.location);
        if changes.image_url.is_some() {
            active.image_url = Set(changes.image_url);
        }

        let updated: Event = active.update(&self.db).await.map_err(db_error)?.try_into()?;
        self.publish(ChangeKind::Update, &updated);
        Ok(updated)
    }

    async fn delete(&self, id: EventId) -> Result<(), AppError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let existing = EventEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_error)?
            .ok_or_else(|| AppError::NotFound("Événement".to_string()))?;

        let interested: Vec<AccountId> = UserInterest::find()
            .filter(user_interest::Column::EventId.eq(id))
            .all(&txn)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        let not_interested: Vec<AccountId> = UserNoInterest::find()
            .filter(user_no_interest::Column::EventId.eq(id))
            .all(&txn)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(|m| m.user_id)
            .collect();

        UserInterest::delete_many()
            .filter(user_interest::Column::EventId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        UserNoInterest::delete_many()
            .filter(user_no_interest::Column::EventId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        EventEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;

        for (kind, users) in [
            (VoteKind::Interested, interested),
            (VoteKind::NotInterested, not_interested),
        ] {
            for user_id in users {
                self.changes.publish(
                    RowChange::new(kind.table(), ChangeKind::Delete)
                        .with("event_id", id)
                        .with("user_id", user_id),
                );
            }
        }
        self.changes.publish(
            RowChange::new(EVENTS_TABLE, ChangeKind::Delete)
                .with("id", id)
                .with("created_by", existing.created_by),
        );
        Ok(())
    }
}
