//! The query client: cached reads, background revalidation and mutations.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::Instant;

use backoffice_client::ServiceError;

use crate::cache::{CacheEntry, CachedData, EntryStatus, InMemoryQueryCache, QueryCache};
use crate::key::QueryKey;
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::retry::RetryPolicy;
use crate::state::QueryState;

pub const STALE_TIME_ENV: &str = "BACKOFFICE_STALE_TIME_SECS";
pub const QUERY_RETRIES_ENV: &str = "BACKOFFICE_QUERY_RETRIES";
pub const GC_TIME_ENV: &str = "BACKOFFICE_GC_TIME_SECS";

/// Most screens treat data as fresh for five minutes.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Entries not stored for this long are dropped from the cache.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(10 * 60);

/// Process-wide query defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub stale_time: Duration,
    pub gc_time: Duration,
    pub retry: RetryPolicy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
            retry: RetryPolicy::default(),
        }
    }
}

impl QueryConfig {
    /// Load from the process environment (and a `.env` file if present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(STALE_TIME_ENV).filter(|v| !v.trim().is_empty()) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{STALE_TIME_ENV} must be a whole number of seconds"))?;
            config.stale_time = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(GC_TIME_ENV).filter(|v| !v.trim().is_empty()) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{GC_TIME_ENV} must be a whole number of seconds"))?;
            config.gc_time = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(QUERY_RETRIES_ENV).filter(|v| !v.trim().is_empty()) {
            let retries = raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("{QUERY_RETRIES_ENV} must be a non-negative integer"))?;
            config.retry = config.retry.with_max_retries(retries);
        }

        Ok(config)
    }
}

/// Per-query options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub stale_time: Duration,
    pub retry: RetryPolicy,
    /// A disabled query never fetches and reads as idle.
    pub enabled: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::from_config(&QueryConfig::default())
    }
}

impl QueryOptions {
    pub fn from_config(config: &QueryConfig) -> Self {
        Self {
            stale_time: config.stale_time,
            retry: config.retry,
            enabled: true,
        }
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// What a mutation announces and which resources it makes stale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MutationOptions {
    pub success_message: Option<String>,
    /// Shown when the error carries no server message.
    pub error_fallback: String,
    pub invalidate: Vec<String>,
}

impl MutationOptions {
    pub fn new(error_fallback: impl Into<String>) -> Self {
        Self {
            error_fallback: error_fallback.into(),
            ..Default::default()
        }
    }

    pub fn on_success(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn invalidates(mut self, resource: impl Into<String>) -> Self {
        self.invalidate.push(resource.into());
        self
    }
}

struct Inner {
    cache: Arc<dyn QueryCache>,
    notifier: Arc<dyn Notifier>,
    config: QueryConfig,
    /// One async lock per key: at most one fetch per key at a time. Locks
    /// nobody holds or waits on are pruned.
    locks: Mutex<HashMap<QueryKey, Arc<AsyncMutex<()>>>>,
}

/// Entry point of the query layer. Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl QueryClient {
    /// In-memory cache, notifications to the log.
    pub fn new(config: QueryConfig) -> Self {
        Self::with_parts(
            Arc::new(InMemoryQueryCache::new()),
            Arc::new(TracingNotifier),
            config,
        )
    }

    pub fn with_parts(
        cache: Arc<dyn QueryCache>,
        notifier: Arc<dyn Notifier>,
        config: QueryConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache,
                notifier,
                config,
                locks: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn cache(&self) -> &Arc<dyn QueryCache> {
        &self.inner.cache
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    pub fn config(&self) -> &QueryConfig {
        &self.inner.config
    }

    pub fn default_options(&self) -> QueryOptions {
        QueryOptions::from_config(&self.inner.config)
    }

    /// Read `key` through the cache.
    ///
    /// - fresh entry: returned as is, no fetch;
    /// - stale, invalidated or failed entry with data: the old data is returned
    ///   flagged `is_fetching` and a refetch runs in the background;
    /// - no data: the fetch (with retries) is awaited.
    pub async fn query<T, F, Fut>(&self, key: QueryKey, options: &QueryOptions, fetcher: F) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ServiceError>> + Send + 'static,
    {
        if !options.enabled {
            return QueryState::idle();
        }

        let now = Instant::now();
        self.collect_garbage(now);
        if let Some(entry) = self.inner.cache.get(&key) {
            let state = QueryState::<T>::from_entry(&entry, entry.status(options.stale_time, now));
            if state.data.is_some() {
                let needs_refetch = entry.error.is_some() || entry.is_stale(options.stale_time, now);
                if !needs_refetch || entry.is_fetching {
                    return state;
                }

                if self.spawn_refetch(key, options.clone(), fetcher) {
                    return QueryState {
                        is_fetching: true,
                        status: Some(EntryStatus::Fetching),
                        ..state
                    };
                }
                return state;
            }
        }

        self.fetch(key, options, fetcher).await
    }

    /// Fetch `key` now, bypassing freshness, and wait for the result.
    pub async fn refetch<T, F, Fut>(&self, key: QueryKey, options: &QueryOptions, fetcher: F) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ServiceError>> + Send + 'static,
    {
        let guard = self.key_lock(&key).lock_owned().await;
        self.fetch_locked(key, options, fetcher, guard).await
    }

    /// Current view of `key` without fetching.
    pub fn snapshot<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        match self.inner.cache.get(key) {
            Some(entry) => {
                let status = entry.status(self.inner.config.stale_time, Instant::now());
                QueryState::from_entry(&entry, status)
            }
            None => QueryState::idle(),
        }
    }

    /// Wait until no fetch of `key` is running, then return its view.
    pub async fn settled<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let lock = self.key_lock(key);
        drop(lock.lock().await);
        self.snapshot(key)
    }

    /// Mark every cached query of `resource` stale; the next read refetches.
    pub fn invalidate(&self, resource: &str) -> usize {
        self.inner.cache.invalidate(resource)
    }

    /// Run a mutation, then announce it and invalidate what it touched.
    ///
    /// Success: success notification, then invalidation (before any refetch
    /// can start). Failure: error notification with the server's message or
    /// the fallback; the error is returned, never swallowed. Mutations are not
    /// retried.
    pub async fn mutate<T, Fut>(&self, options: MutationOptions, fut: Fut) -> Result<T, ServiceError>
    where
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        match fut.await {
            Ok(value) => {
                if let Some(message) = options.success_message {
                    self.inner.notifier.notify(Notification::success(message));
                }
                for resource in &options.invalidate {
                    self.invalidate(resource);
                }
                Ok(value)
            }
            Err(err) => {
                let message = user_message(&err, &options.error_fallback);
                tracing::error!(error = ?err, %message, "mutation failed");
                self.inner.notifier.notify(Notification::error(message));
                Err(err)
            }
        }
    }

    fn key_lock(&self, key: &QueryKey) -> Arc<AsyncMutex<()>> {
        let mut locks = match self.inner.locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks.retain(|k, lock| k == key || Arc::strong_count(lock) > 1);
        locks.entry(key.clone()).or_default().clone()
    }

    /// Number of per-key locks currently tracked.
    pub fn tracked_locks(&self) -> usize {
        match self.inner.locks.lock() {
            Ok(locks) => locks.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Drop cache entries idle for longer than `gc_time`.
    fn collect_garbage(&self, now: Instant) {
        if let Some(cutoff) = now.checked_sub(self.inner.config.gc_time) {
            self.inner.cache.evict_idle(cutoff);
        }
    }

    /// Start a background refetch unless one is already running.
    fn spawn_refetch<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetcher: F) -> bool
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ServiceError>> + Send + 'static,
    {
        let Ok(guard) = self.key_lock(&key).try_lock_owned() else {
            return false;
        };

        self.inner.cache.update(&key, &mut |entry| entry.is_fetching = true);
        tracing::debug!(query = %key, "background refetch");

        let client = self.clone();
        tokio::spawn(async move {
            let _ = client.fetch_locked::<T, F, Fut>(key, &options, fetcher, guard).await;
        });
        true
    }

    async fn fetch<T, F, Fut>(&self, key: QueryKey, options: &QueryOptions, fetcher: F) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ServiceError>> + Send + 'static,
    {
        let seen = self.inner.cache.get(&key).map(|e| e.version).unwrap_or(0);
        let guard = self.key_lock(&key).lock_owned().await;

        // An identical fetch finished while we waited: share its outcome.
        if let Some(entry) = self.inner.cache.get(&key) {
            if entry.version != seen && !entry.invalidated {
                let status = entry.status(options.stale_time, Instant::now());
                return QueryState::from_entry(&entry, status);
            }
        }

        self.fetch_locked(key, options, fetcher, guard).await
    }

    async fn fetch_locked<T, F, Fut>(
        &self,
        key: QueryKey,
        options: &QueryOptions,
        fetcher: F,
        _guard: OwnedMutexGuard<()>,
    ) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ServiceError>> + Send + 'static,
    {
        let cache = &self.inner.cache;
        let epoch = cache.epoch(key.resource());
        cache.update(&key, &mut |entry| entry.is_fetching = true);

        let label = key.to_string();
        tracing::debug!(query = %label, "fetching");
        let result = options.retry.run(&label, || fetcher()).await;

        // Invalidated mid-flight: store the result but keep it stale.
        let unchanged = cache.epoch(key.resource()) == epoch;
        let now = Instant::now();
        let mut stored = CacheEntry::default();

        match result {
            Ok(data) => {
                let data: CachedData = Arc::new(data);
                cache.update(&key, &mut |entry| {
                    entry.data = Some(data.clone());
                    entry.error = None;
                    entry.updated_at = Some(now);
                    entry.is_fetching = false;
                    if unchanged {
                        entry.invalidated = false;
                    }
                    entry.version += 1;
                    stored = entry.clone();
                });
                if !unchanged {
                    tracing::debug!(query = %label, "invalidated while fetching; result kept stale");
                }
            }
            Err(err) => {
                tracing::warn!(query = %label, error = ?err, "fetch failed");
                cache.update(&key, &mut |entry| {
                    entry.error = Some(err.clone());
                    entry.is_fetching = false;
                    entry.version += 1;
                    stored = entry.clone();
                });
            }
        }

        QueryState::from_entry(&stored, stored.status(options.stale_time, now))
    }
}

/// Server-provided messages win; transport and decoding failures get the fallback.
fn user_message(err: &ServiceError, fallback: &str) -> String {
    match err {
        ServiceError::Api { message, .. } | ServiceError::Unauthorized { message } => message.clone(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_defaults_and_overrides() {
        let config = QueryConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.stale_time, Duration::from_secs(300));
        assert_eq!(config.gc_time, Duration::from_secs(600));
        assert_eq!(config.retry.max_retries, 3);

        let config = QueryConfig::from_lookup(lookup_from(&[
            (STALE_TIME_ENV, "30"),
            (GC_TIME_ENV, "120"),
            (QUERY_RETRIES_ENV, "0"),
        ]))
        .unwrap();
        assert_eq!(config.stale_time, Duration::from_secs(30));
        assert_eq!(config.gc_time, Duration::from_secs(120));
        assert_eq!(config.retry, RetryPolicy::no_retry());

        assert!(QueryConfig::from_lookup(lookup_from(&[(STALE_TIME_ENV, "soon")])).is_err());
    }

    #[test]
    fn user_message_prefers_server_text() {
        assert_eq!(
            user_message(&ServiceError::api(422, "SKU already exists"), "Failed to add product"),
            "SKU already exists"
        );
        let network = ServiceError::Network {
            message: "Failed to create product".into(),
            detail: "connection refused".into(),
        };
        assert_eq!(user_message(&network, "Failed to add product"), "Failed to add product");
    }
}
