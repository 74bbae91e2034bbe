use std::collections::HashMap;
use tokio::sync::broadcast::{self, error::RecvError};

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One committed row mutation. `columns` carries the numeric key columns
/// subscribers filter on (for deletes, the values of the removed row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowChange {
    pub table: String,
    pub kind: ChangeKind,
    pub columns: HashMap<String, i64>,
}

impl RowChange {
    pub fn new(table: &str, kind: ChangeKind) -> Self {
        Self {
            table: table.to_string(),
            kind,
            columns: HashMap::new(),
        }
    }

    pub fn with(mut self, column: &str, value: i64) -> Self {
        self.columns.insert(column.to_string(), value);
        self
    }

    pub fn column(&self, name: &str) -> Option<i64> {
        self.columns.get(name).copied()
    }
}

/// `column = value` row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub value: i64,
}

impl RowFilter {
    pub fn eq(column: &str, value: i64) -> Self {
        Self {
            column: column.to_string(),
            value,
        }
    }

    fn accepts(&self, change: &RowChange) -> bool {
        change.column(&self.column) == Some(self.value)
    }
}

/// Process-wide stream of row changes, fanned out to every subscriber.
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<RowChange>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, change: RowChange) {
        tracing::debug!(table = %change.table, kind = ?change.kind, "row change");
        // No subscribers is not an error.
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self, table: &str, filter: Option<RowFilter>) -> Subscription {
        Subscription {
            table: table.to_string(),
            filter,
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Filtered view over the feed. Dropping it unsubscribes.
pub struct Subscription {
    table: String,
    filter: Option<RowFilter>,
    rx: broadcast::Receiver<RowChange>,
}

impl Subscription {
    /// Next matching change, or `None` once the feed is gone.
    ///
    /// A lagging subscriber has missed rows it cannot identify, so it gets a
    /// synthetic update for its table; handlers refetch on any change.
    pub async fn next(&mut self) -> Option<RowChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if self.accepts(&change) => return Some(change),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(table = %self.table, skipped, "change subscriber lagged");
                    let mut change = RowChange::new(&self.table, ChangeKind::Update);
                    if let Some(filter) = &self.filter {
                        change = change.with(&filter.column, filter.value);
                    }
                    return Some(change);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn accepts(&self, change: &RowChange) -> bool {
        change.table == self.table && self.filter.as_ref().is_none_or(|f| f.accepts(change))
    }
}
