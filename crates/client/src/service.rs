//! Generic CRUD service over a [`Resource`] endpoint.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use backoffice_core::{ListEnvelope, ListParams, Resource, ResourceId};

use crate::envelope::{extract_message, normalize_entity, normalize_list};
use crate::error::{Operation, ServiceError};
use crate::transport::ApiClient;

/// Server acknowledgement of a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub message: String,
}

/// The five operations every resource endpoint supports.
///
/// Payloads are plain JSON so that create/update can send partial documents
/// (the server owns `id` and timestamps).
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    async fn list(&self, params: &ListParams) -> Result<ListEnvelope<R>, ServiceError>;

    async fn get_by_id(&self, id: &ResourceId) -> Result<R, ServiceError>;

    async fn create(&self, payload: Value) -> Result<R, ServiceError>;

    async fn update(&self, id: &ResourceId, payload: Value) -> Result<R, ServiceError>;

    async fn delete(&self, id: &ResourceId) -> Result<DeleteAck, ServiceError>;
}

/// [`ResourceApi`] backed by the REST API at `R::PATH`.
pub struct ResourceService<R> {
    api: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    fn fallback(op: Operation) -> String {
        op.fallback_message(R::NAME, R::LABEL)
    }

    fn require_id<'a>(id: &'a ResourceId, op: Operation) -> Result<&'a str, ServiceError> {
        if id.is_empty() {
            return Err(ServiceError::invalid_request(format!(
                "{}: id is required",
                Self::fallback(op)
            )));
        }
        Ok(id.as_str())
    }
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for ResourceService<R> {
    async fn list(&self, params: &ListParams) -> Result<ListEnvelope<R>, ServiceError> {
        let fallback = Self::fallback(Operation::List);
        let url = self.api.endpoint(R::PATH, &[])?;
        let body = self.api.get(url, &params.query_pairs(), &fallback).await?;
        normalize_list(&R::ENVELOPE, body, params, &fallback)
    }

    async fn get_by_id(&self, id: &ResourceId) -> Result<R, ServiceError> {
        let fallback = Self::fallback(Operation::Get);
        let id = Self::require_id(id, Operation::Get)?;
        let url = self.api.endpoint(R::PATH, &[id])?;
        let body = self.api.get(url, &[], &fallback).await?;
        normalize_entity(&R::ENVELOPE, body, &fallback)
    }

    async fn create(&self, payload: Value) -> Result<R, ServiceError> {
        let fallback = Self::fallback(Operation::Create);
        let url = self.api.endpoint(R::PATH, &[])?;
        let body = self.api.post(url, &payload, &fallback).await?;
        normalize_entity(&R::ENVELOPE, body, &fallback)
    }

    async fn update(&self, id: &ResourceId, payload: Value) -> Result<R, ServiceError> {
        let fallback = Self::fallback(Operation::Update);
        let id = Self::require_id(id, Operation::Update)?;
        let url = self.api.endpoint(R::PATH, &[id])?;
        let body = self.api.put(url, &payload, &fallback).await?;
        normalize_entity(&R::ENVELOPE, body, &fallback)
    }

    async fn delete(&self, id: &ResourceId) -> Result<DeleteAck, ServiceError> {
        let fallback = Self::fallback(Operation::Delete);
        let id = Self::require_id(id, Operation::Delete)?;
        let url = self.api.endpoint(R::PATH, &[id])?;
        let body = self.api.delete(url, &fallback).await?;
        let message = extract_message(&body).unwrap_or_else(|| format!("{} deleted", R::LABEL));
        Ok(DeleteAck { message })
    }
}
