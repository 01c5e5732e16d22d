//! Query cache abstraction and its in-memory implementation.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use backoffice_client::ServiceError;

use crate::key::QueryKey;

/// Type-erased cached value; readers downcast to the type they queried with.
pub type CachedData = Arc<dyn Any + Send + Sync>;

/// Observable state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Fresh,
    Stale,
    Fetching,
    Error,
}

/// One cached value plus its bookkeeping.
#[derive(Clone, Default)]
pub struct CacheEntry {
    pub data: Option<CachedData>,
    pub error: Option<ServiceError>,
    pub updated_at: Option<Instant>,
    pub is_fetching: bool,
    /// Set by invalidation; cleared only by a fetch that started after it.
    pub invalidated: bool,
    /// Bumped every time a fetch result is stored.
    pub version: u64,
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("has_data", &self.data.is_some())
            .field("error", &self.error)
            .field("updated_at", &self.updated_at)
            .field("is_fetching", &self.is_fetching)
            .field("invalidated", &self.invalidated)
            .field("version", &self.version)
            .finish()
    }
}

impl CacheEntry {
    /// Entry holding a freshly fetched value.
    pub fn with_data(data: CachedData, now: Instant) -> Self {
        Self {
            data: Some(data),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    pub fn is_stale(&self, stale_time: Duration, now: Instant) -> bool {
        if self.invalidated || self.data.is_none() {
            return true;
        }
        match self.updated_at {
            Some(at) => now.saturating_duration_since(at) >= stale_time,
            None => true,
        }
    }

    pub fn status(&self, stale_time: Duration, now: Instant) -> EntryStatus {
        if self.is_fetching {
            EntryStatus::Fetching
        } else if self.error.is_some() {
            EntryStatus::Error
        } else if self.is_stale(stale_time, now) {
            EntryStatus::Stale
        } else {
            EntryStatus::Fresh
        }
    }
}

/// Change notifications published by a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Updated(QueryKey),
    Invalidated { resource: String, entries: usize },
    Removed(QueryKey),
}

/// A subscription to cache events.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: mpsc::UnboundedReceiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: mpsc::UnboundedReceiver<M>) -> Self {
        Self { receiver }
    }

    /// Wait for the next message; `None` once the cache is gone.
    pub async fn recv(&mut self) -> Option<M> {
        self.receiver.recv().await
    }

    /// Try to receive a message without waiting.
    pub fn try_recv(&mut self) -> Result<M, mpsc::error::TryRecvError> {
        self.receiver.try_recv()
    }
}

/// Key/value store behind the query client.
///
/// Entries are modified in place through [`QueryCache::update`] so concurrent
/// writers (a fetch storing its result, a mutation invalidating) never lose
/// each other's flags.
pub trait QueryCache: Send + Sync {
    fn get(&self, key: &QueryKey) -> Option<CacheEntry>;

    fn set(&self, key: QueryKey, entry: CacheEntry);

    /// Apply `f` to the entry for `key`, creating an empty one first if needed.
    fn update(&self, key: &QueryKey, f: &mut dyn FnMut(&mut CacheEntry));

    /// Mark every entry of `resource` invalidated; returns how many.
    fn invalidate(&self, resource: &str) -> usize;

    /// Number of invalidations `resource` has seen. Fetches compare it before
    /// and after to detect an invalidation that raced them.
    fn epoch(&self, resource: &str) -> u64;

    fn remove(&self, key: &QueryKey) -> Option<CacheEntry>;

    /// Drop entries that are not fetching and were last stored before
    /// `cutoff`; returns how many. Entries that never stored data stay.
    fn evict_idle(&self, cutoff: Instant) -> usize;

    fn keys(&self) -> Vec<QueryKey>;

    fn subscribe(&self) -> Subscription<CacheEvent>;
}

impl<S> QueryCache for Arc<S>
where
    S: QueryCache + ?Sized,
{
    fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        (**self).get(key)
    }

    fn set(&self, key: QueryKey, entry: CacheEntry) {
        (**self).set(key, entry)
    }

    fn update(&self, key: &QueryKey, f: &mut dyn FnMut(&mut CacheEntry)) {
        (**self).update(key, f)
    }

    fn invalidate(&self, resource: &str) -> usize {
        (**self).invalidate(resource)
    }

    fn epoch(&self, resource: &str) -> u64 {
        (**self).epoch(resource)
    }

    fn remove(&self, key: &QueryKey) -> Option<CacheEntry> {
        (**self).remove(key)
    }

    fn evict_idle(&self, cutoff: Instant) -> usize {
        (**self).evict_idle(cutoff)
    }

    fn keys(&self) -> Vec<QueryKey> {
        (**self).keys()
    }

    fn subscribe(&self) -> Subscription<CacheEvent> {
        (**self).subscribe()
    }
}

/// Process-wide in-memory cache.
#[derive(Debug, Default)]
pub struct InMemoryQueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    epochs: RwLock<HashMap<String, u64>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<CacheEvent>>>,
}

impl InMemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn publish(&self, event: CacheEvent) {
        if let Ok(mut subs) = self.subscribers.lock() {
            // Drop any dead subscribers while publishing.
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

impl QueryCache for InMemoryQueryCache {
    fn get(&self, key: &QueryKey) -> Option<CacheEntry> {
        let map = self.entries.read().ok()?;
        map.get(key).cloned()
    }

    fn set(&self, key: QueryKey, entry: CacheEntry) {
        if let Ok(mut map) = self.entries.write() {
            map.insert(key.clone(), entry);
        }
        self.publish(CacheEvent::Updated(key));
    }

    fn update(&self, key: &QueryKey, f: &mut dyn FnMut(&mut CacheEntry)) {
        if let Ok(mut map) = self.entries.write() {
            f(map.entry(key.clone()).or_default());
        }
        self.publish(CacheEvent::Updated(key.clone()));
    }

    fn invalidate(&self, resource: &str) -> usize {
        // Epoch first: a fetch that reads the epoch after this point started
        // after the invalidation.
        if let Ok(mut epochs) = self.epochs.write() {
            *epochs.entry(resource.to_string()).or_default() += 1;
        }

        let mut entries = 0;
        if let Ok(mut map) = self.entries.write() {
            for (key, entry) in map.iter_mut() {
                if key.matches_resource(resource) {
                    entry.invalidated = true;
                    entries += 1;
                }
            }
        }

        tracing::debug!(resource, entries, "cache invalidated");
        self.publish(CacheEvent::Invalidated {
            resource: resource.to_string(),
            entries,
        });
        entries
    }

    fn epoch(&self, resource: &str) -> u64 {
        self.epochs
            .read()
            .ok()
            .and_then(|epochs| epochs.get(resource).copied())
            .unwrap_or(0)
    }

    fn remove(&self, key: &QueryKey) -> Option<CacheEntry> {
        let removed = self.entries.write().ok()?.remove(key);
        if removed.is_some() {
            self.publish(CacheEvent::Removed(key.clone()));
        }
        removed
    }

    fn evict_idle(&self, cutoff: Instant) -> usize {
        let evicted: Vec<QueryKey> = match self.entries.write() {
            Ok(mut map) => {
                let idle: Vec<QueryKey> = map
                    .iter()
                    .filter(|(_, e)| !e.is_fetching && e.updated_at.is_some_and(|at| at < cutoff))
                    .map(|(k, _)| k.clone())
                    .collect();
                for key in &idle {
                    map.remove(key);
                }
                idle
            }
            Err(_) => return 0,
        };
        if !evicted.is_empty() {
            tracing::debug!(entries = evicted.len(), "idle cache entries evicted");
        }
        let count = evicted.len();
        for key in evicted {
            self.publish(CacheEvent::Removed(key));
        }
        count
    }

    fn keys(&self) -> Vec<QueryKey> {
        match self.entries.read() {
            Ok(map) => {
                let mut keys: Vec<_> = map.keys().cloned().collect();
                keys.sort();
                keys
            }
            Err(_) => vec![],
        }
    }

    fn subscribe(&self) -> Subscription<CacheEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::QueryScope;
    use backoffice_core::ResourceId;

    fn list_key(resource: &str, page: u32) -> QueryKey {
        QueryKey::new(resource, QueryScope::List(format!("page={page}&limit=10")))
    }

    #[tokio::test(start_paused = true)]
    async fn entry_goes_stale_after_stale_time() {
        let now = Instant::now();
        let entry = CacheEntry::with_data(Arc::new(1u32), now);
        let five_minutes = Duration::from_secs(300);

        assert_eq!(entry.status(five_minutes, now), EntryStatus::Fresh);
        assert_eq!(
            entry.status(five_minutes, now + Duration::from_secs(299)),
            EntryStatus::Fresh
        );
        assert_eq!(
            entry.status(five_minutes, now + Duration::from_secs(300)),
            EntryStatus::Stale
        );
    }

    #[tokio::test]
    async fn invalidate_reaches_every_key_of_the_resource_only() {
        let cache = InMemoryQueryCache::new();
        let now = Instant::now();
        cache.set(list_key("products", 1), CacheEntry::with_data(Arc::new(1u32), now));
        cache.set(list_key("products", 2), CacheEntry::with_data(Arc::new(2u32), now));
        cache.set(
            QueryKey::new("products", QueryScope::Detail(ResourceId::new("p1"))),
            CacheEntry::with_data(Arc::new(3u32), now),
        );
        cache.set(list_key("orders", 1), CacheEntry::with_data(Arc::new(4u32), now));

        assert_eq!(cache.epoch("products"), 0);
        assert_eq!(cache.invalidate("products"), 3);
        assert_eq!(cache.epoch("products"), 1);
        assert_eq!(cache.epoch("orders"), 0);

        assert!(cache.get(&list_key("products", 2)).unwrap().invalidated);
        assert!(!cache.get(&list_key("orders", 1)).unwrap().invalidated);
    }

    #[tokio::test]
    async fn subscribers_see_updates_and_invalidations() {
        let cache = InMemoryQueryCache::new();
        let mut sub = cache.subscribe();

        let key = list_key("products", 1);
        cache.update(&key, &mut |entry| entry.is_fetching = true);
        cache.invalidate("products");

        assert_eq!(sub.recv().await, Some(CacheEvent::Updated(key)));
        assert_eq!(
            sub.recv().await,
            Some(CacheEvent::Invalidated {
                resource: "products".into(),
                entries: 1
            })
        );
        assert!(sub.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn evict_idle_drops_old_entries_but_not_running_fetches() {
        let cache = InMemoryQueryCache::new();
        let start = Instant::now();
        cache.set(list_key("products", 1), CacheEntry::with_data(Arc::new(1u32), start));
        cache.set(list_key("products", 2), CacheEntry::with_data(Arc::new(2u32), start));
        cache.update(&list_key("products", 2), &mut |entry| entry.is_fetching = true);
        cache.update(&list_key("orders", 1), &mut |entry| entry.is_fetching = false);

        tokio::time::advance(Duration::from_secs(60)).await;
        cache.set(list_key("products", 3), CacheEntry::with_data(Arc::new(3u32), Instant::now()));

        assert_eq!(cache.evict_idle(start + Duration::from_secs(1)), 1);
        assert_eq!(
            cache.keys(),
            vec![list_key("orders", 1), list_key("products", 2), list_key("products", 3)]
        );
    }

    #[tokio::test]
    async fn shared_through_arc() {
        let cache: Arc<dyn QueryCache> = Arc::new(InMemoryQueryCache::new());
        let key = list_key("customers", 1);
        cache.set(key.clone(), CacheEntry::with_data(Arc::new("rows".to_string()), Instant::now()));

        let entry = cache.get(&key).unwrap();
        let data = entry.data.unwrap().downcast::<String>().unwrap();
        assert_eq!(data.as_str(), "rows");
        assert_eq!(cache.keys(), vec![key.clone()]);
        assert!(cache.remove(&key).is_some());
        assert!(cache.get(&key).is_none());
    }
}
