//! Per-resource query and mutation bindings used by screens.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use backoffice_client::{DeleteAck, ResourceApi, ServiceError};
use backoffice_core::{ListEnvelope, ListParams, Resource, ResourceId, SortOrder};

use crate::client::{MutationOptions, QueryClient, QueryOptions};
use crate::key::QueryKey;
use crate::mutation::MutationHandle;
use crate::state::QueryState;

/// List/detail queries and create/update/delete mutations for one resource.
///
/// Success messages read "{Label} added successfully!" etc.; error fallbacks
/// "Failed to add {label}" etc. Every successful mutation invalidates the
/// whole resource, lists and details alike.
pub struct ResourceHooks<R: Resource> {
    client: QueryClient,
    api: Arc<dyn ResourceApi<R>>,
    options: QueryOptions,
    create_state: MutationHandle,
    update_state: MutationHandle,
    delete_state: MutationHandle,
}

impl<R: Resource> Clone for ResourceHooks<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            api: Arc::clone(&self.api),
            options: self.options.clone(),
            create_state: self.create_state.clone(),
            update_state: self.update_state.clone(),
            delete_state: self.delete_state.clone(),
        }
    }
}

impl<R: Resource> ResourceHooks<R> {
    pub fn new(client: QueryClient, api: Arc<dyn ResourceApi<R>>) -> Self {
        let options = client.default_options();
        Self {
            client,
            api,
            options,
            create_state: MutationHandle::new(),
            update_state: MutationHandle::new(),
            delete_state: MutationHandle::new(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    pub fn api(&self) -> &Arc<dyn ResourceApi<R>> {
        &self.api
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn list_key(params: &ListParams) -> QueryKey {
        QueryKey::list::<R>(params)
    }

    pub fn detail_key(id: &ResourceId) -> QueryKey {
        QueryKey::detail::<R>(id)
    }

    pub async fn list(&self, params: &ListParams) -> QueryState<ListEnvelope<R>> {
        let api = Arc::clone(&self.api);
        let request = params.clone();
        self.client
            .query(Self::list_key(params), &self.options, move || {
                let api = Arc::clone(&api);
                let request = request.clone();
                async move { api.list(&request).await }
            })
            .await
    }

    /// Detail query; an empty id disables it (idle state, no request).
    pub async fn detail(&self, id: &ResourceId) -> QueryState<R> {
        let options = self.options.clone().enabled(self.options.enabled && !id.is_empty());
        let api = Arc::clone(&self.api);
        let id = id.clone();
        self.client
            .query(Self::detail_key(&id), &options, move || {
                let api = Arc::clone(&api);
                let id = id.clone();
                async move { api.get_by_id(&id).await }
            })
            .await
    }

    pub async fn create<P>(&self, payload: &P) -> Result<R, ServiceError>
    where
        P: Serialize + Sync + ?Sized,
    {
        let options = MutationOptions::new(format!("Failed to add {}", R::label_lower()))
            .on_success(format!("{} added successfully!", R::LABEL))
            .invalidates(R::NAME);
        let body = to_payload(payload);
        let api = Arc::clone(&self.api);

        self.create_state
            .track(self.client.mutate(options, async move { api.create(body?).await }))
            .await
    }

    pub async fn update<P>(&self, id: &ResourceId, payload: &P) -> Result<R, ServiceError>
    where
        P: Serialize + Sync + ?Sized,
    {
        let options = MutationOptions::new(format!("Failed to update {}", R::label_lower()))
            .on_success(format!("{} updated successfully!", R::LABEL))
            .invalidates(R::NAME);
        let body = to_payload(payload);
        let api = Arc::clone(&self.api);
        let id = id.clone();

        self.update_state
            .track(self.client.mutate(options, async move { api.update(&id, body?).await }))
            .await
    }

    pub async fn delete(&self, id: &ResourceId) -> Result<DeleteAck, ServiceError> {
        let options = MutationOptions::new(format!("Failed to delete {}", R::label_lower()))
            .on_success(format!("{} deleted successfully!", R::LABEL))
            .invalidates(R::NAME);
        let api = Arc::clone(&self.api);
        let id = id.clone();

        self.delete_state
            .track(self.client.mutate(options, async move { api.delete(&id).await }))
            .await
    }

    pub fn create_state(&self) -> &MutationHandle {
        &self.create_state
    }

    pub fn update_state(&self) -> &MutationHandle {
        &self.update_state
    }

    pub fn delete_state(&self) -> &MutationHandle {
        &self.delete_state
    }

    /// A list handle that starts at `params`.
    pub fn list_query(&self, params: ListParams) -> ListQuery<R> {
        ListQuery::new(self.clone(), params)
    }
}

fn to_payload<P: Serialize + ?Sized>(payload: &P) -> Result<Value, ServiceError> {
    serde_json::to_value(payload)
        .map_err(|e| ServiceError::invalid_request(format!("payload could not be encoded: {e}")))
}

/// A list screen's query: current params plus the last page it showed.
///
/// While the next page loads (or if it fails) the previous page stays
/// visible, flagged `is_placeholder_data`, so the table does not flicker.
pub struct ListQuery<R: Resource> {
    hooks: ResourceHooks<R>,
    params: ListParams,
    last_page: Option<Arc<ListEnvelope<R>>>,
}

impl<R: Resource> ListQuery<R> {
    pub fn new(hooks: ResourceHooks<R>, params: ListParams) -> Self {
        Self {
            hooks,
            params,
            last_page: None,
        }
    }

    pub fn params(&self) -> &ListParams {
        &self.params
    }

    pub fn key(&self) -> QueryKey {
        ResourceHooks::<R>::list_key(&self.params)
    }

    pub fn set_page(&mut self, page: u32) {
        self.params = self.params.clone().with_page(page);
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.params = self.params.clone().with_limit(limit).with_page(1);
    }

    /// New search text; back to page 1.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.params = self.params.clone().with_search(search).with_page(1);
    }

    /// New filter value (empty clears it); back to page 1.
    pub fn set_filter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params = self.params.clone().with_filter(name, value).with_page(1);
    }

    pub fn set_sort(&mut self, sort_by: impl Into<String>, order: SortOrder) {
        self.params = self.params.clone().with_sort(sort_by, order);
    }

    /// Read the current page through the cache.
    pub async fn load(&mut self) -> QueryState<ListEnvelope<R>> {
        let state = self.hooks.list(&self.params).await;
        self.remember(state)
    }

    /// Non-blocking view of the current page.
    pub fn state(&self) -> QueryState<ListEnvelope<R>> {
        self.with_placeholder(self.hooks.client().snapshot(&self.key()))
    }

    fn remember(&mut self, state: QueryState<ListEnvelope<R>>) -> QueryState<ListEnvelope<R>> {
        if let Some(data) = &state.data {
            self.last_page = Some(Arc::clone(data));
        }
        self.with_placeholder(state)
    }

    fn with_placeholder(&self, mut state: QueryState<ListEnvelope<R>>) -> QueryState<ListEnvelope<R>> {
        if state.data.is_none() {
            if let Some(last) = &self.last_page {
                state.data = Some(Arc::clone(last));
                state.is_placeholder_data = true;
            }
        }
        state
    }
}
