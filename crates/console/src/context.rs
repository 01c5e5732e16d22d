//! Process wiring: one API client and one query client per run.

use std::sync::Arc;

use backoffice_client::{ApiClient, ClientConfig, ResourceService, ServiceError};
use backoffice_core::Resource;
use backoffice_query::{
    InMemoryQueryCache, Notification, NotificationLevel, Notifier, QueryClient, QueryConfig,
    ResourceHooks, TracingNotifier,
};

/// Shows success notifications on stderr and logs every notification.
/// Errors are left to the command's alert so they are shown once.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        if notification.level == NotificationLevel::Success {
            eprintln!("{}", notification.message);
        }
        TracingNotifier.notify(notification);
    }
}

#[derive(Debug, Clone)]
pub struct Console {
    api: ApiClient,
    client: QueryClient,
}

impl Console {
    pub fn new(config: &ClientConfig, query: QueryConfig) -> Result<Self, ServiceError> {
        Self::with_notifier(config, query, Arc::new(ConsoleNotifier))
    }

    pub fn with_notifier(
        config: &ClientConfig,
        query: QueryConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ServiceError> {
        let api = ApiClient::new(config)?;
        let client = QueryClient::with_parts(Arc::new(InMemoryQueryCache::new()), notifier, query);
        Ok(Self { api, client })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub fn hooks<R: Resource>(&self) -> ResourceHooks<R> {
        ResourceHooks::new(
            self.client.clone(),
            Arc::new(ResourceService::<R>::new(self.api.clone())),
        )
    }
}
