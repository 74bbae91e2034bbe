use super::db_error;
use super::entities::{event, user_interest, user_no_interest};
use super::entities::{Account as AccountEntity, Event as EventEntity, UserInterest, UserNoInterest};
use super::event_repository::with_owner;
use crate::application::ports::VoteStore;
use crate::domain::{AccountId, EventId, EventVoteSummary, EventWithOwner, InterestCounts, VoteKind};
use crate::infrastructure::realtime::{ChangeFeed, ChangeKind, RowChange};
use agora_errors::AppError;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};

/// Membership tables plus the denormalized counters on `events`.
///
/// Counts returned to callers always come from the membership tables; the
/// counters are kept in step inside the same transaction.
#[derive(Clone)]
pub struct VoteRepository {
    db: DatabaseConnection,
    changes: ChangeFeed,
}

impl VoteRepository {
    pub fn new(db: DatabaseConnection, changes: ChangeFeed) -> Self {
        Self { db, changes }
    }

    fn publish(&self, kind: VoteKind, change: ChangeKind, event_id: EventId, user_id: AccountId) {
        self.changes.publish(
            RowChange::new(kind.table(), change)
                .with("event_id", event_id)
                .with("user_id", user_id),
        );
    }
}

async fn count_members<C: ConnectionTrait>(
    db: &C,
    kind: VoteKind,
    event_id: EventId,
) -> Result<u64, DbErr> {
    match kind {
        VoteKind::Interested => {
            UserInterest::find()
                .filter(user_interest::Column::EventId.eq(event_id))
                .count(db)
                .await
        }
        VoteKind::NotInterested => {
            UserNoInterest::find()
                .filter(user_no_interest::Column::EventId.eq(event_id))
                .count(db)
                .await
        }
    }
}

async fn is_member<C: ConnectionTrait>(
    db: &C,
    kind: VoteKind,
    event_id: EventId,
    user_id: AccountId,
) -> Result<bool, DbErr> {
    Ok(match kind {
        VoteKind::Interested => UserInterest::find_by_id((event_id, user_id))
            .one(db)
            .await?
            .is_some(),
        VoteKind::NotInterested => UserNoInterest::find_by_id((event_id, user_id))
            .one(db)
            .await?
            .is_some(),
    })
}

/// Returns whether a row was removed.
async fn delete_member<C: ConnectionTrait>(
    db: &C,
    kind: VoteKind,
    event_id: EventId,
    user_id: AccountId,
) -> Result<bool, DbErr> {
    let result = match kind {
        VoteKind::Interested => UserInterest::delete_by_id((event_id, user_id)).exec(db).await?,
        VoteKind::NotInterested => {
            UserNoInterest::delete_by_id((event_id, user_id))
                .exec(db)
                .await?
        }
    };
    Ok(result.rows_affected > 0)
}

async fn insert_member<C: ConnectionTrait>(
    db: &C,
    kind: VoteKind,
    event_id: EventId,
    user_id: AccountId,
) -> Result<(), DbErr> {
    match kind {
        VoteKind::Interested => {
            UserInterest::insert(user_interest::ActiveModel {
                event_id: Set(event_id),
                user_id: Set(user_id),
                created_at: Set(Utc::now()),
            })
            .exec(db)
            .await?;
        }
        VoteKind::NotInterested => {
            UserNoInterest::insert(user_no_interest::ActiveModel {
                event_id: Set(event_id),
                user_id: Set(user_id),
                created_at: Set(Utc::now()),
            })
            .exec(db)
            .await?;
        }
    }
    Ok(())
}

/// Moves the stored counter by one, never below zero.
async fn bump_counter<C: ConnectionTrait>(
    db: &C,
    kind: VoteKind,
    event_id: EventId,
    up: bool,
) -> Result<(), DbErr> {
    let (column, name) = match kind {
        VoteKind::Interested => (event::Column::InterestsCount, "interests_count"),
        VoteKind::NotInterested => (event::Column::NoInterestsCount, "no_interests_count"),
    };
    let value = if up {
        Expr::col(column).add(1)
    } else {
        Expr::cust(format!("GREATEST({name} - 1, 0)"))
    };
    EventEntity::update_many()
        .col_expr(column, value)
        .filter(event::Column::Id.eq(event_id))
        .exec(db)
        .await?;
    Ok(())
}

impl VoteStore for VoteRepository {
    async fn count(&self, kind: VoteKind, event_id: EventId) -> Result<u64, AppError> {
        count_members(&self.db, kind, event_id)
            .await
            .map_err(db_error)
    }

    async fn has_vote(
        &self,
        kind: VoteKind,
        event_id: EventId,
        user_id: AccountId,
    ) -> Result<bool, AppError> {
        is_member(&self.db, kind, event_id, user_id)
            .await
            .map_err(db_error)
    }

    async fn remove(
        &self,
        kind: VoteKind,
        event_id: EventId,
        user_id: AccountId,
    ) -> Result<(), AppError> {
        let txn = self.db.begin().await.map_err(db_error)?;
        let removed = delete_member(&txn, kind, event_id, user_id)
            .await
            .map_err(db_error)?;
        if removed {
            bump_counter(&txn, kind, event_id, false)
                .await
                .map_err(db_error)?;
        }
        txn.commit().await.map_err(db_error)?;

        if removed {
            self.publish(kind, ChangeKind::Delete, event_id, user_id);
        }
        Ok(())
    }

    async fn cast(
        &self,
        kind: VoteKind,
        event_id: EventId,
        user_id: AccountId,
    ) -> Result<(), AppError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let dropped = delete_member(&txn, kind.opposite(), event_id, user_id)
            .await
            .map_err(db_error)?;
        if dropped {
            bump_counter(&txn, kind.opposite(), event_id, false)
                .await
                .map_err(db_error)?;
        }

        let already = is_member(&txn, kind, event_id, user_id)
            .await
            .map_err(db_error)?;
        if !already {
            insert_member(&txn, kind, event_id, user_id)
                .await
                .map_err(db_error)?;
            bump_counter(&txn, kind, event_id, true)
                .await
                .map_err(db_error)?;
        }

        txn.commit().await.map_err(db_error)?;

        if dropped {
            self.publish(kind.opposite(), ChangeKind::Delete, event_id, user_id);
        }
        if !already {
            self.publish(kind, ChangeKind::Insert, event_id, user_id);
        }
        Ok(())
    }

    async fn voters(&self, kind: VoteKind, event_id: EventId) -> Result<Vec<AccountId>, AppError> {
        let users = match kind {
            VoteKind::Interested => UserInterest::find()
                .filter(user_interest::Column::EventId.eq(event_id))
                .all(&self.db)
                .await
                .map_err(db_error)?
                .into_iter()
                .map(|m| m.user_id)
                .collect(),
            VoteKind::NotInterested => UserNoInterest::find()
                .filter(user_no_interest::Column::EventId.eq(event_id))
                .all(&self.db)
                .await
                .map_err(db_error)?
                .into_iter()
                .map(|m| m.user_id)
                .collect(),
        };
        Ok(users)
    }

    async fn summaries_for_owner(
        &self,
        owner: AccountId,
    ) -> Result<Vec<EventVoteSummary>, AppError> {
        let events = EventEntity::find()
            .filter(event::Column::CreatedBy.eq(owner))
            .order_by_desc(event::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        let mut summaries = Vec::with_capacity(events.len());
        for event in events {
            let interests = count_members(&self.db, VoteKind::Interested, event.id)
                .await
                .map_err(db_error)?;
            let no_interests = count_members(&self.db, VoteKind::NotInterested, event.id)
                .await
                .map_err(db_error)?;
            summaries.push(EventVoteSummary {
                event_id: event.id,
                title: event.title,
                interests,
                no_interests,
            });
        }
        Ok(summaries)
    }

    async fn interest_counts(&self, user_id: AccountId) -> Result<InterestCounts, AppError> {
        let interested = UserInterest::find()
            .filter(user_interest::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_error)?;
        let not_interested = UserNoInterest::find()
            .filter(user_no_interest::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(db_error)?;
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
        let event_ids: Vec<EventId> = match kind {
            VoteKind::Interested => UserInterest::find()
                .filter(user_interest::Column::UserId.eq(user_id))
                .all(&self.db)
                .await
                .map_err(db_error)?
                .into_iter()
                .map(|m| m.event_id)
                .collect(),
            VoteKind::NotInterested => UserNoInterest::find()
                .filter(user_no_interest::Column::UserId.eq(user_id))
                .all(&self.db)
                .await
                .map_err(db_error)?
                .into_iter()
                .map(|m| m.event_id)
                .collect(),
        };
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        EventEntity::find()
            .filter(event::Column::Id.is_in(event_ids))
            .order_by_asc(event::Column::StartDate)
            .find_also_related(AccountEntity)
            .all(&self.db)
            .await
            .map_err(db_error)?
            .into_iter()
            .map(with_owner)
            .collect()
    }
}
