use super::db_error;
use super::entities::{event, notification};
use super::entities::{Event as EventEntity, Notification as NotificationEntity};
use crate::application::ports::NotificationStore;
use crate::application::NOTIFICATIONS_TABLE;
use crate::domain::{AccountId, EventId, EventStatus, Notification, NotificationId};
use crate::infrastructure::realtime::{ChangeFeed, ChangeKind, RowChange};
use agora_errors::AppError;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DatabaseConnection};

#[derive(Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
    changes: ChangeFeed,
}

impl NotificationRepository {
    pub fn new(db: DatabaseConnection, changes: ChangeFeed) -> Self {
        Self { db, changes }
    }

    fn publish(&self, change: RowChange) {
        self.changes.publish(change);
    }
}

fn to_domain(
    (model, event): (notification::Model, Option<event::Model>),
) -> Result<Notification, AppError> {
    let event_status = event
        .map(|e| e.status.parse::<EventStatus>())
        .transpose()
        .map_err(|e| AppError::Database(e.to_string()))?;
    Ok(Notification {
        id: model.id,
        user_id: model.user_id,
        event_id: model.event_id,
        title: model.title,
        message: model.message,
        is_read: model.is_read,
        created_at: model.created_at,
        event_status,
    })
}

impl NotificationStore for NotificationRepository {
    async fn list_for_user(&self, user_id: AccountId) -> Result<Vec<Notification>, AppError> {
        NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .find_also_related(EventEntity)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn create(
        &self,
        user_id: AccountId,
        event_id: EventId,
        title: String,
        message: String,
    ) -> Result<Notification, AppError> {
        let model = notification::ActiveModel {
            user_id: Set(user_id),
            event_id: Set(event_id),
            title: Set(title),
            message: Set(message),
            is_read: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(db_error)?;

        self.publish(
            RowChange::new(NOTIFICATIONS_TABLE, ChangeKind::Insert)
                .with("id", model.id)
                .with("user_id", user_id)
                .with("event_id", event_id),
        );
        to_domain((model, None))
    }

    async fn mark_read(&self, user_id: AccountId, id: NotificationId) -> Result<(), AppError> {
        NotificationEntity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_error)?;
        self.publish(
            RowChange::new(NOTIFICATIONS_TABLE, ChangeKind::Update)
                .with("id", id)
                .with("user_id", user_id),
        );
        Ok(())
    }

    async fn mark_all_read(&self, user_id: AccountId) -> Result<(), AppError> {
        let result = NotificationEntity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_error)?;
        tracing::debug!(user_id, updated = result.rows_affected, "notifications marked read");
        self.publish(RowChange::new(NOTIFICATIONS_TABLE, ChangeKind::Update).with("user_id", user_id));
        Ok(())
    }

    async fn delete(&self, user_id: AccountId, id: NotificationId) -> Result<(), AppError> {
        NotificationEntity::delete_many()
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_error)?;
        self.publish(
            RowChange::new(NOTIFICATIONS_TABLE, ChangeKind::Delete)
                .with("id", id)
                .with("user_id", user_id),
        );
        Ok(())
    }

    async fn delete_all(&self, user_id: AccountId) -> Result<(), AppError> {
        NotificationEntity::delete_many()
            .filter(notification::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_error)?;
        self.publish(RowChange::new(NOTIFICATIONS_TABLE, ChangeKind::Delete).with("user_id", user_id));
        Ok(())
    }
}
