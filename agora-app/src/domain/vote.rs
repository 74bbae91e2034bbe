use super::account::AccountId;
use super::event::EventId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two mutually exclusive vote collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKind {
    Interested,
    NotInterested,
}

impl VoteKind {
    pub const ALL: [VoteKind; 2] = [VoteKind::Interested, VoteKind::NotInterested];

    pub fn opposite(&self) -> Self {
        match self {
            Self::Interested => Self::NotInterested,
            Self::NotInterested => Self::Interested,
        }
    }

    /// Name of the membership table backing this collection.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Interested => "user_interests",
            Self::NotInterested => "user_no_interests",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interested => f.write_str("interested"),
            Self::NotInterested => f.write_str("not_interested"),
        }
    }
}

/// Live counts of both collections for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStats {
    pub interests: u64,
    pub no_interests: u64,
}

impl VoteStats {
    pub fn new(interests: u64, no_interests: u64) -> Self {
        Self {
            interests,
            no_interests,
        }
    }

    pub fn total(&self) -> u64 {
        self.interests + self.no_interests
    }
}

/// What a voting widget displays: the counts plus the viewer's own vote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteState {
    pub stats: VoteStats,
    pub mine: Option<VoteKind>,
}

/// Store operations needed to move from the current vote to the clicked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotePlan {
    /// Clicking the active vote withdraws it.
    Retract(VoteKind),
    /// Remove `replace` (if any) before casting `kind`.
    Cast {
        replace: Option<VoteKind>,
        kind: VoteKind,
    },
}

impl VotePlan {
    pub fn for_click(current: Option<VoteKind>, requested: VoteKind) -> Self {
        match current {
            Some(active) if active == requested => Self::Retract(requested),
            other => Self::Cast {
                replace: other,
                kind: requested,
            },
        }
    }

    pub fn resulting_vote(&self) -> Option<VoteKind> {
        match self {
            Self::Retract(_) => None,
            Self::Cast { kind, .. } => Some(*kind),
        }
    }
}

/// Per-event response counts for an organizer's statistics view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventVoteSummary {
    pub event_id: EventId,
    pub title: String,
    pub interests: u64,
    pub no_interests: u64,
}

impl EventVoteSummary {
    pub fn has_responses(&self) -> bool {
        self.interests + self.no_interests > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizerStats {
    pub events: Vec<EventVoteSummary>,
    pub total_events: usize,
    pub total_responses: u64,
}

impl OrganizerStats {
    pub fn from_summaries(events: Vec<EventVoteSummary>) -> Self {
        let total_responses = events.iter().map(|s| s.interests + s.no_interests).sum();
        Self {
            total_events: events.len(),
            total_responses,
            events,
        }
    }
}

/// How many events a participant voted for in each collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestCounts {
    pub user_id: AccountId,
    pub interested: u64,
    pub not_interested: u64,
}
