//! Pending/error tracking for mutations.

use std::future::Future;
use std::sync::{Arc, Mutex};

use backoffice_client::ServiceError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationState {
    pub is_pending: bool,
    pub error: Option<ServiceError>,
}

/// Shared handle a form reads to disable its submit button or show an error.
#[derive(Debug, Clone, Default)]
pub struct MutationHandle {
    state: Arc<Mutex<MutationState>>,
}

impl MutationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutationState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn is_pending(&self) -> bool {
        self.state().is_pending
    }

    pub fn reset(&self) {
        self.set(MutationState::default());
    }

    /// Run `fut`, marking the handle pending until it resolves.
    pub async fn track<T, Fut>(&self, fut: Fut) -> Result<T, ServiceError>
    where
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        self.set(MutationState {
            is_pending: true,
            error: None,
        });

        let result = fut.await;

        self.set(MutationState {
            is_pending: false,
            error: result.as_ref().err().cloned(),
        });
        result
    }

    fn set(&self, state: MutationState) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracks_pending_and_error() {
        let handle = MutationHandle::new();
        let observer = handle.clone();

        let result: Result<(), _> = handle
            .track(async {
                assert!(observer.is_pending());
                Err(ServiceError::api(422, "SKU already exists"))
            })
            .await;

        assert!(result.is_err());
        let state = handle.state();
        assert!(!state.is_pending);
        assert_eq!(state.error, Some(ServiceError::api(422, "SKU already exists")));

        handle.reset();
        assert_eq!(handle.state(), MutationState::default());
    }
}
