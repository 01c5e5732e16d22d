//! Customer addresses, a collection nested under a customer.

use serde_json::Value;

use backoffice_core::ResourceId;
use backoffice_core::envelope::lookup;
use backoffice_parties::CustomerAddress;

use crate::envelope::normalize_ids;
use crate::error::ServiceError;
use crate::transport::ApiClient;

const FALLBACK: &str = "Failed to fetch customer addresses";
const ADDRESS_PATHS: &[&[&str]] = &[&[], &["data"], &["data", "addresses"], &["addresses"]];

/// Read access to `/private/customers/{id}/addresses`.
#[derive(Debug, Clone)]
pub struct CustomerAddresses {
    api: ApiClient,
}

impl CustomerAddresses {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Addresses of one customer. The endpoint answers either a bare array or
    /// `{ data: [...] }` / `{ data: { addresses: [...] } }`.
    pub async fn list(&self, customer_id: &ResourceId) -> Result<Vec<CustomerAddress>, ServiceError> {
        if customer_id.is_empty() {
            return Err(ServiceError::invalid_request(format!(
                "{FALLBACK}: customer id is required"
            )));
        }

        let url = self
            .api
            .endpoint("/private/customers", &[customer_id.as_str(), "addresses"])?;
        let mut body = self.api.get(url, &[], FALLBACK).await?;
        normalize_ids(&mut body);

        let items = ADDRESS_PATHS
            .iter()
            .filter_map(|path| lookup(&body, path))
            .find_map(Value::as_array)
            .cloned()
            .ok_or_else(|| {
                tracing::warn!(customer_id = %customer_id, "address response has no collection");
                ServiceError::Normalization {
                    message: FALLBACK.to_string(),
                    detail: "no address array in response".to_string(),
                }
            })?;

        items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| ServiceError::Decode {
                    message: FALLBACK.to_string(),
                    detail: e.to_string(),
                })
            })
            .collect()
    }
}
