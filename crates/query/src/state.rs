//! What a screen sees when it reads a query.

use std::sync::Arc;

use tokio::time::Instant;

use backoffice_client::ServiceError;

use crate::cache::{CacheEntry, EntryStatus};

#[derive(Debug)]
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    /// No data yet and a fetch is running.
    pub is_loading: bool,
    /// A fetch is running (initial or background).
    pub is_fetching: bool,
    /// `data` belongs to a previous key (e.g. the last page) and is shown
    /// while the current key loads or after it failed.
    pub is_placeholder_data: bool,
    pub error: Option<ServiceError>,
    pub updated_at: Option<Instant>,
    pub status: Option<EntryStatus>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_placeholder_data: self.is_placeholder_data,
            error: self.error.clone(),
            updated_at: self.updated_at,
            status: self.status,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T: Send + Sync + 'static> QueryState<T> {
    /// View of a cache entry. Data of another type than `T` reads as absent.
    pub fn from_entry(entry: &CacheEntry, status: EntryStatus) -> Self {
        let data = entry
            .data
            .clone()
            .and_then(|data| data.downcast::<T>().ok());
        Self {
            is_loading: data.is_none() && entry.is_fetching,
            is_fetching: entry.is_fetching,
            is_placeholder_data: false,
            error: entry.error.clone(),
            updated_at: entry.updated_at,
            status: Some(status),
            data,
        }
    }
}

impl<T> QueryState<T> {
    /// A query that is disabled or has never run.
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            is_fetching: false,
            is_placeholder_data: false,
            error: None,
            updated_at: None,
            status: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status.is_none()
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some() && self.error.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }
}
