//! `backoffice-query`: the Query/Cache layer.
//!
//! **Responsibility:** memoize Resource Service reads per `(resource, params)`
//! key, serve stale data while revalidating, retry transient failures with
//! exponential backoff, and turn mutations into notifications plus cache
//! invalidation.
//!
//! One [`QueryClient`] (and so one cache) per process; screens hold cheap
//! clones of it through [`ResourceHooks`].

pub mod cache;
pub mod client;
pub mod hooks;
pub mod key;
pub mod mutation;
pub mod notify;
pub mod retry;
pub mod state;

pub use cache::{CacheEntry, CacheEvent, CachedData, EntryStatus, InMemoryQueryCache, QueryCache, Subscription};
pub use client::{MutationOptions, QueryClient, QueryConfig, QueryOptions};
pub use hooks::{ListQuery, ResourceHooks};
pub use key::{QueryKey, QueryScope};
pub use mutation::{MutationHandle, MutationState};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use retry::RetryPolicy;
pub use state::QueryState;
