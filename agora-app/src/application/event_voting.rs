use super::ports::VoteStore;
use crate::domain::{AccountId, EventId, VoteKind, VotePlan, VoteState, VoteStats};
use crate::infrastructure::realtime::{ChangeFeed, RowChange, RowFilter};
use agora_errors::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Outcome of a click on one of the vote buttons.
#[derive(Debug)]
pub enum VoteAttempt {
    Applied(VoteState),
    /// Another vote on this instance has not finished yet.
    InFlight,
    /// Anonymous viewer, or the instance was torn down.
    Unavailable,
    Failed(AppError),
}

struct Shared<S> {
    store: Arc<S>,
    event_id: EventId,
    viewer: Option<AccountId>,
    state: watch::Sender<VoteState>,
    in_flight: AtomicBool,
    torn_down: AtomicBool,
}

impl<S: VoteStore> Shared<S> {
    fn is_live(&self) -> bool {
        !self.torn_down.load(Ordering::Acquire)
    }

    async fn refresh_stats(&self) -> Result<VoteStats, AppError> {
        let (interests, no_interests) = tokio::join!(
            self.store.count(VoteKind::Interested, self.event_id),
            self.store.count(VoteKind::NotInterested, self.event_id),
        );
        let stats = match (interests, no_interests) {
            (Ok(interests), Ok(no_interests)) => VoteStats::new(interests, no_interests),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => return Err(e),
            (Err(a), Err(b)) => {
                return Err(AppError::Database(format!(
                    "interests: {a}; no_interests: {b}"
                )))
            }
        };
        if self.is_live() {
            self.state.send_if_modified(|s| {
                let changed = s.stats != stats;
                s.stats = stats;
                changed
            });
        }
        Ok(stats)
    }

    async fn load_user_vote(&self) -> Result<Option<VoteKind>, AppError> {
        let Some(user_id) = self.viewer else {
            return Ok(None);
        };
        let interested = self
            .store
            .has_vote(VoteKind::Interested, self.event_id, user_id)
            .await?;
        let not_interested = self
            .store
            .has_vote(VoteKind::NotInterested, self.event_id, user_id)
            .await?;

        if interested && not_interested {
            tracing::warn!(
                event_id = self.event_id,
                user_id,
                "user holds both votes, keeping interested"
            );
        }
        let mine = if interested {
            Some(VoteKind::Interested)
        } else if not_interested {
            Some(VoteKind::NotInterested)
        } else {
            None
        };
        self.set_mine(mine);
        Ok(mine)
    }

    /// Lagged changes carry no user, so they count as touching the viewer.
    fn touches_viewer(&self, change: &RowChange) -> bool {
        self.viewer.is_some_and(|viewer| {
            change
                .column("user_id")
                .is_none_or(|user_id| user_id == viewer)
        })
    }

    fn set_mine(&self, mine: Option<VoteKind>) {
        if self.is_live() {
            self.state.send_if_modified(|s| {
                let changed = s.mine != mine;
                s.mine = mine;
                changed
            });
        }
    }

    async fn apply(&self, plan: VotePlan, user_id: AccountId) -> Result<(), AppError> {
        match plan {
            VotePlan::Retract(kind) => self.store.remove(kind, self.event_id, user_id).await,
            VotePlan::Cast { replace, kind } => {
                if let Some(previous) = replace {
                    self.store.remove(previous, self.event_id, user_id).await?;
                }
                self.store.cast(kind, self.event_id, user_id).await
            }
        }
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Vote widget state for one (event, viewer) pair.
///
/// Counts are always re-read from the store, after a local vote and after
/// every change on either vote table for this event.
pub struct EventVoting<S: VoteStore + 'static> {
    shared: Arc<Shared<S>>,
    task: JoinHandle<()>,
}

impl<S: VoteStore + 'static> EventVoting<S> {
    /// Subscribes to both vote tables, then loads stats and the viewer's
    /// vote. Initial load failures are logged; the state stays at zero until
    /// the next successful refresh.
    pub async fn mount(
        store: Arc<S>,
        changes: &ChangeFeed,
        event_id: EventId,
        viewer: Option<AccountId>,
    ) -> Self {
        let (state, _) = watch::channel(VoteState::default());
        let shared = Arc::new(Shared {
            store,
            event_id,
            viewer,
            state,
            in_flight: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
        });

        let filter = RowFilter::eq("event_id", event_id);
        let mut interests = changes.subscribe(VoteKind::Interested.table(), Some(filter.clone()));
        let mut no_interests = changes.subscribe(VoteKind::NotInterested.table(), Some(filter));

        let task_shared = Arc::clone(&shared);
        let task = tokio::spawn(async move {
            loop {
                let change = tokio::select! {
                    change = interests.next() => change,
                    change = no_interests.next() => change,
                };
                let Some(change) = change else { break };
                tracing::debug!(event_id, table = %change.table, "vote change received");
                if let Err(e) = task_shared.refresh_stats().await {
                    tracing::error!(event_id, "failed to refresh vote stats: {}", e);
                }
                // Another session of the same account may have voted.
                if task_shared.touches_viewer(&change) {
                    if let Err(e) = task_shared.load_user_vote().await {
                        tracing::error!(event_id, "failed to reload user vote: {}", e);
                    }
                }
            }
        });

        let voting = Self { shared, task };
        if let Err(e) = voting.shared.refresh_stats().await {
            tracing::error!(event_id, "failed to load vote stats: {}", e);
        }
        if let Err(e) = voting.shared.load_user_vote().await {
            tracing::error!(event_id, "failed to load user vote: {}", e);
        }
        voting
    }

    pub fn event_id(&self) -> EventId {
        self.shared.event_id
    }

    pub fn viewer(&self) -> Option<AccountId> {
        self.shared.viewer
    }

    pub fn state(&self) -> VoteState {
        *self.shared.state.borrow()
    }

    pub fn stats(&self) -> VoteStats {
        self.state().stats
    }

    pub fn subscribe(&self) -> watch::Receiver<VoteState> {
        self.shared.state.subscribe()
    }

    pub async fn refresh_stats(&self) -> Result<VoteStats, AppError> {
        self.shared.refresh_stats().await
    }

    pub async fn load_user_vote(&self) -> Result<Option<VoteKind>, AppError> {
        self.shared.load_user_vote().await
    }

    pub async fn vote(&self, kind: VoteKind) -> VoteAttempt {
        let Some(user_id) = self.shared.viewer else {
            return VoteAttempt::Unavailable;
        };
        if !self.shared.is_live() {
            return VoteAttempt::Unavailable;
        }
        if self
            .shared
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return VoteAttempt::InFlight;
        }
        let _guard = InFlightGuard(&self.shared.in_flight);

        let plan = VotePlan::for_click(self.state().mine, kind);
        if let Err(e) = self.shared.apply(plan, user_id).await {
            tracing::error!(
                event_id = self.shared.event_id,
                user_id,
                %kind,
                "vote failed: {}",
                e
            );
            return VoteAttempt::Failed(e);
        }

        self.shared.set_mine(plan.resulting_vote());
        if let Err(e) = self.shared.refresh_stats().await {
            tracing::error!(
                event_id = self.shared.event_id,
                "vote applied but stats refresh failed: {}",
                e
            );
        }
        VoteAttempt::Applied(self.state())
    }

    /// Stops the realtime subscription. Later results are discarded and
    /// further votes are refused.
    pub fn teardown(&self) {
        self.shared.torn_down.store(true, Ordering::Release);
        self.task.abort();
    }

    pub fn is_torn_down(&self) -> bool {
        !self.shared.is_live()
    }
}

impl<S: VoteStore + 'static> Drop for EventVoting<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
