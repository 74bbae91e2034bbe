use super::event::{Event, EventStatus};
use super::feed::StatusFilter;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub draft: usize,
    pub official: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// An organizer's own events with counts, filtered and sorted by start date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardView {
    events: Vec<Event>,
}

impl DashboardView {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn counts(&self) -> StatusCounts {
        let draft = self
            .events
            .iter()
            .filter(|e| e.status == EventStatus::Draft)
            .count();
        StatusCounts {
            draft,
            official: self.events.len() - draft,
            total: self.events.len(),
        }
    }

    pub fn visible(&self, filter: StatusFilter, sort: SortDirection) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| filter.accepts(e.status))
            .cloned()
            .collect();
        events.sort_by(|a, b| match sort {
            SortDirection::Asc => a.start_date.cmp(&b.start_date),
            SortDirection::Desc => b.start_date.cmp(&a.start_date),
        });
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn event(id: i64, status: EventStatus, day: u32) -> Event {
        let start = Utc.with_ymd_and_hms(2025, 5, day, 10, 0, 0).unwrap();
        Event {
            id,
            title: format!("Event {id}"),
            description: "desc".to_string(),
            contact: "c@univ.fr".to_string(),
            status,
            start_date: start,
            end_date: start + Duration::hours(1),
            location: None,
            image_url: None,
            created_by: 9,
            created_at: start,
        }
    }

    #[test]
    fn test_counts_and_sort() {
        let view = DashboardView::new(vec![
            event(1, EventStatus::Draft, 3),
            event(2, EventStatus::Official, 1),
            event(3, EventStatus::Official, 7),
        ]);
        assert_eq!(
            view.counts(),
            StatusCounts {
                draft: 1,
                official: 2,
                total: 3
            }
        );

        let asc: Vec<i64> = view
            .visible(StatusFilter::All, SortDirection::Asc)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(asc, vec![2, 1, 3]);

        let official: Vec<i64> = view
            .visible(StatusFilter::Only(EventStatus::Official), SortDirection::Desc)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(official, vec![3, 2]);
    }
}
