use super::events::require_organizer;
use super::ports::VoteStore;
use crate::domain::{EventWithOwner, InterestCounts, OrganizerStats, Profile, VoteKind};
use agora_errors::AppError;
use std::sync::Arc;

pub struct StatsService<S: VoteStore> {
    store: Arc<S>,
}

impl<S: VoteStore> Clone for StatsService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: VoteStore> StatsService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn organizer_stats(&self, organizer: &Profile) -> Result<OrganizerStats, AppError> {
        require_organizer(organizer)?;
        let summaries = self.store.summaries_for_owner(organizer.user_id()).await?;
        Ok(OrganizerStats::from_summaries(summaries))
    }

    pub async fn interest_counts(&self, profile: &Profile) -> Result<InterestCounts, AppError> {
        self.store.interest_counts(profile.user_id()).await
    }

    pub async fn voted_events(
        &self,
        profile: &Profile,
        kind: VoteKind,
    ) -> Result<Vec<EventWithOwner>, AppError> {
        self.store.voted_events(profile.user_id(), kind).await
    }
}
