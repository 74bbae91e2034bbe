use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Weak};

/// Mounted controllers shared between concurrent requests.
///
/// The registry only holds weak handles: a controller lives as long as some
/// request or stream holds its `Arc`, and dropping the last one tears it
/// down. Dead entries are pruned on the next mount.
pub struct ControllerRegistry<K, V> {
    mounted: DashMap<K, Weak<V>>,
}

impl<K: Eq + Hash + Clone, V> Default for ControllerRegistry<K, V> {
    fn default() -> Self {
        Self {
            mounted: DashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> ControllerRegistry<K, V> {
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.mounted.get(key).and_then(|v| v.value().upgrade())
    }

    /// Returns the live controller for `key` or mounts one. When two callers
    /// race, the first insert wins and the loser's controller is dropped.
    pub async fn get_or_mount<F, Fut>(&self, key: K, mount: F) -> Arc<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(live) = self.get(&key) {
            return live;
        }
        let mounted = Arc::new(mount().await);
        let winner = match self.mounted.entry(key) {
            Entry::Occupied(mut slot) => match slot.get().upgrade() {
                Some(live) => live,
                None => {
                    slot.insert(Arc::downgrade(&mounted));
                    mounted
                }
            },
            Entry::Vacant(slot) => {
                slot.insert(Arc::downgrade(&mounted));
                mounted
            }
        };
        self.prune();
        winner
    }

    /// Removes the matching keys and returns the controllers still alive so
    /// the caller can tear them down.
    pub fn evict_where(&self, mut pred: impl FnMut(&K) -> bool) -> Vec<Arc<V>> {
        let mut evicted = Vec::new();
        self.mounted.retain(|k, v| {
            if pred(k) {
                evicted.extend(v.upgrade());
                false
            } else {
                true
            }
        });
        evicted
    }

    /// Drops entries whose controller is gone. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let before = self.mounted.len();
        self.mounted.retain(|_, v| v.strong_count() > 0);
        before - self.mounted.len()
    }

    /// Number of controllers currently alive.
    pub fn len(&self) -> usize {
        self.mounted
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::EventVoting;
    use crate::infrastructure::memory::MemoryBackend;
    use crate::infrastructure::realtime::ChangeFeed;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_mounts_once_while_held() {
        let registry: ControllerRegistry<(i64, Option<i64>), String> = ControllerRegistry::default();
        let mounts = AtomicUsize::new(0);
        let mut held = Vec::new();
        for _ in 0..3 {
            let value = registry
                .get_or_mount((1, Some(7)), || async {
                    mounts.fetch_add(1, Ordering::SeqCst);
                    "mounted".to_string()
                })
                .await;
            assert_eq!(*value, "mounted");
            held.push(value);
        }
        assert_eq!(mounts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_released_once_last_holder_drops() {
        let registry: ControllerRegistry<i64, String> = ControllerRegistry::default();
        let mounts = AtomicUsize::new(0);
        let mount = || async {
            mounts.fetch_add(1, Ordering::SeqCst);
            "bell".to_string()
        };

        let first = registry.get_or_mount(3, mount).await;
        assert_eq!(registry.len(), 1);
        drop(first);
        assert!(registry.is_empty());
        assert!(registry.get(&3).is_none());

        let _again = registry.get_or_mount(3, mount).await;
        assert_eq!(mounts.load(Ordering::SeqCst), 2);
        assert_eq!(registry.prune(), 0);
    }

    #[tokio::test]
    async fn test_evict_returns_live_controllers() {
        let registry: ControllerRegistry<(i64, Option<i64>), u8> = ControllerRegistry::default();
        let mut held = Vec::new();
        for key in [(1, Some(7)), (2, Some(7)), (1, Some(8)), (1, None)] {
            held.push(registry.get_or_mount(key, || async { 0 }).await);
        }
        // one of the viewer's widgets was already released
        held.remove(1);

        let evicted = registry.evict_where(|(_, viewer)| *viewer == Some(7));
        assert_eq!(evicted.len(), 1);
        assert_eq!(registry.len(), 2);
        assert!(registry.get(&(1, None)).is_some());
    }

    #[tokio::test]
    async fn test_dropped_widgets_release_their_subscriptions() {
        let backend = Arc::new(MemoryBackend::new(ChangeFeed::default()));
        let registry: ControllerRegistry<(i64, Option<i64>), EventVoting<MemoryBackend>> =
            ControllerRegistry::default();

        for event_id in 1000..1050 {
            let widget = registry
                .get_or_mount((event_id, None), || {
                    EventVoting::mount(Arc::clone(&backend), backend.changes(), event_id, None)
                })
                .await;
            assert_eq!(backend.changes().subscriber_count(), 2);
            drop(widget);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(registry.is_empty());
        assert!(registry.mounted.len() <= 1);
        assert_eq!(backend.changes().subscriber_count(), 0);
    }
}
