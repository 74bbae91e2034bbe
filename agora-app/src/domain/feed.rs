use super::event::{Event, EventStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 3;
pub const SEARCH_DEBOUNCE_MS: i64 = 300;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Only(EventStatus),
}

impl StatusFilter {
    pub fn accepts(&self, status: EventStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

/// Client-side filter over already loaded events. Never triggers a fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub status: StatusFilter,
    pub search: String,
}

impl EventFilter {
    pub fn is_searching(&self) -> bool {
        !self.search.trim().is_empty()
    }

    pub fn matches(&self, event: &Event) -> bool {
        if !self.status.accepts(event.status) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || event.title.to_lowercase().contains(&needle)
            || event.description.to_lowercase().contains(&needle)
    }
}

/// Pages of events in fetch order. Each page keeps its own ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPages {
    page_size: u64,
    pages: Vec<Vec<Event>>,
}

impl Default for FeedPages {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FeedPages {
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size: page_size.max(1),
            pages: Vec::new(),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn pages(&self) -> &[Vec<Event>] {
        &self.pages
    }

    pub fn push_page(&mut self, page: Vec<Event>) {
        self.pages.push(page);
    }

    pub fn reset(&mut self) {
        self.pages.clear();
    }

    /// Number of events loaded across every page.
    pub fn loaded(&self) -> u64 {
        self.pages.iter().map(|p| p.len() as u64).sum()
    }

    /// A full last page means the server may hold more rows.
    pub fn has_next_page(&self) -> bool {
        match self.pages.last() {
            None => true,
            Some(last) => last.len() as u64 == self.page_size,
        }
    }

    pub fn next_offset(&self) -> Option<u64> {
        self.has_next_page().then(|| self.loaded())
    }

    /// Loaded events matching `filter`, each page sorted by start date
    /// descending, page order preserved.
    pub fn filtered(&self, filter: &EventFilter) -> Vec<Event> {
        self.pages
            .iter()
            .flat_map(|page| {
                let mut page: Vec<Event> =
                    page.iter().filter(|e| filter.matches(e)).cloned().collect();
                page.sort_by(|a, b| b.start_date.cmp(&a.start_date));
                page
            })
            .collect()
    }

    pub fn view(&self, filter: &EventFilter, load: &FeedLoad) -> FeedView {
        if self.pages.is_empty() {
            return match load {
                FeedLoad::Failed(message) => FeedView::Failed(message.clone()),
                _ => FeedView::LoadingFirstPage,
            };
        }

        let events = self.filtered(filter);
        if events.is_empty() && !matches!(load, FeedLoad::FetchingMore) {
            return FeedView::Empty {
                searching: filter.is_searching(),
            };
        }

        let tail = if matches!(load, FeedLoad::FetchingMore) {
            FeedTail::FetchingMore
        } else if self.has_next_page() {
            FeedTail::MoreAvailable
        } else {
            FeedTail::Exhausted
        };
        FeedView::Items { events, tail }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedLoad {
    #[default]
    Idle,
    LoadingFirstPage,
    FetchingMore,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedTail {
    FetchingMore,
    MoreAvailable,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedView {
    LoadingFirstPage,
    Failed(String),
    Empty { searching: bool },
    Items { events: Vec<Event>, tail: FeedTail },
}

/// Holds the latest value and reports it settled once no newer value
/// arrived for the debounce window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounced<T> {
    pending: Option<(T, DateTime<Utc>)>,
    settled: T,
    window: Duration,
}

impl<T: Clone + PartialEq> Debounced<T> {
    pub fn new(initial: T) -> Self {
        Self::with_window(initial, Duration::milliseconds(SEARCH_DEBOUNCE_MS))
    }

    pub fn with_window(initial: T, window: Duration) -> Self {
        Self {
            pending: None,
            settled: initial,
            window,
        }
    }

    pub fn set(&mut self, value: T, now: DateTime<Utc>) {
        self.pending = Some((value, now));
    }

    /// Promotes the pending value once its window has elapsed. Returns
    /// whether the settled value changed.
    pub fn settle(&mut self, now: DateTime<Utc>) -> bool {
        match self.pending.take() {
            Some((value, at)) if now - at >= self.window => {
                let changed = value != self.settled;
                self.settled = value;
                changed
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    pub fn settled(&self) -> &T {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: i64, title: &str, status: EventStatus, start_day: u32) -> Event {
        let start = Utc.with_ymd_and_hms(2025, 4, start_day, 9, 0, 0).unwrap();
        Event {
            id,
            title: title.to_string(),
            description: format!("Description de {title}"),
            contact: "contact@univ.fr".to_string(),
            status,
            start_date: start,
            end_date: start + Duration::hours(2),
            location: Some("Salle 1".to_string()),
            image_url: None,
            created_by: 1,
            created_at: start,
        }
    }

    fn page(ids: &[(i64, EventStatus, u32)]) -> Vec<Event> {
        ids.iter()
            .map(|(id, status, day)| event(*id, &format!("Event {id}"), *status, *day))
            .collect()
    }

    #[test]
    fn test_pagination_ends_on_short_page() {
        let mut feed = FeedPages::new(3);
        assert_eq!(feed.next_offset(), Some(0));

        feed.push_page(page(&[
            (1, EventStatus::Draft, 1),
            (2, EventStatus::Draft, 2),
            (3, EventStatus::Draft, 3),
        ]));
        assert!(feed.has_next_page());
        assert_eq!(feed.next_offset(), Some(3));

        feed.push_page(page(&[(4, EventStatus::Draft, 4), (5, EventStatus::Draft, 5)]));
        assert!(!feed.has_next_page());
        assert_eq!(feed.next_offset(), None);
        assert_eq!(feed.loaded(), 5);
    }

    #[test]
    fn test_empty_last_page_exhausts_feed() {
        let mut feed = FeedPages::new(3);
        feed.push_page(page(&[
            (1, EventStatus::Draft, 1),
            (2, EventStatus::Draft, 2),
            (3, EventStatus::Draft, 3),
        ]));
        feed.push_page(Vec::new());
        assert!(!feed.has_next_page());
    }

    #[test]
    fn test_each_page_sorted_by_start_date_desc() {
        let mut feed = FeedPages::new(3);
        feed.push_page(page(&[
            (1, EventStatus::Draft, 2),
            (2, EventStatus::Draft, 9),
            (3, EventStatus::Draft, 5),
        ]));
        feed.push_page(page(&[(4, EventStatus::Draft, 20), (5, EventStatus::Draft, 1)]));

        let ids: Vec<i64> = feed
            .filtered(&EventFilter::default())
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1, 4, 5]);
    }

    #[test]
    fn test_status_filters_partition_loaded_events() {
        let mut feed = FeedPages::new(3);
        feed.push_page(page(&[
            (1, EventStatus::Draft, 1),
            (2, EventStatus::Official, 2),
            (3, EventStatus::Draft, 3),
        ]));
        feed.push_page(page(&[(4, EventStatus::Official, 4)]));

        let only = |status| EventFilter {
            status: StatusFilter::Only(status),
            search: String::new(),
        };
        let all = feed.filtered(&EventFilter::default());
        let drafts = feed.filtered(&only(EventStatus::Draft));
        let official = feed.filtered(&only(EventStatus::Official));

        assert_eq!(drafts.len() + official.len(), all.len());
        assert!(drafts.iter().all(|e| e.status == EventStatus::Draft));
        assert_eq!(feed.loaded(), 4);
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_or_description() {
        let mut feed = FeedPages::new(3);
        let mut rust = event(1, "Atelier RUST", EventStatus::Official, 3);
        rust.description = "Programmation système".to_string();
        let mut other = event(2, "Conférence", EventStatus::Official, 4);
        other.description = "Initiation à rust embarqué".to_string();
        feed.push_page(vec![rust, other, event(3, "Chorale", EventStatus::Draft, 5)]);

        let filter = EventFilter {
            status: StatusFilter::All,
            search: "rust".to_string(),
        };
        let ids: Vec<i64> = feed.filtered(&filter).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_view_states() {
        let mut feed = FeedPages::new(3);
        assert_eq!(
            feed.view(&EventFilter::default(), &FeedLoad::LoadingFirstPage),
            FeedView::LoadingFirstPage
        );
        assert_eq!(
            feed.view(&EventFilter::default(), &FeedLoad::Failed("réseau".into())),
            FeedView::Failed("réseau".into())
        );

        feed.push_page(page(&[(1, EventStatus::Draft, 1)]));
        let searching = EventFilter {
            status: StatusFilter::All,
            search: "introuvable".to_string(),
        };
        assert_eq!(
            feed.view(&searching, &FeedLoad::Idle),
            FeedView::Empty { searching: true }
        );

        match feed.view(&EventFilter::default(), &FeedLoad::Idle) {
            FeedView::Items { events, tail } => {
                assert_eq!(events.len(), 1);
                assert_eq!(tail, FeedTail::Exhausted);
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn test_debounce_only_settles_after_window() {
        let t0 = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
        let mut search = Debounced::new(String::new());

        search.set("ra".to_string(), t0);
        search.set("rust".to_string(), t0 + Duration::milliseconds(100));
        assert!(!search.settle(t0 + Duration::milliseconds(350)));
        assert_eq!(search.settled(), "");

        assert!(search.settle(t0 + Duration::milliseconds(400)));
        assert_eq!(search.settled(), "rust");
        assert!(!search.is_pending());
    }
}
