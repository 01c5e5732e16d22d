//! HTTP transport: one `reqwest::Client`, the base URL and a bearer token source.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::envelope::extract_message;
use crate::error::ServiceError;

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Source of the bearer token attached to outgoing requests.
///
/// Obtaining and refreshing tokens is the login flow's concern; the transport
/// only reads whatever is current.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// In-process token holder shared between the transport and whoever signs in.
#[derive(Debug, Clone, Default)]
pub struct SharedToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl SharedToken {
    pub fn new(token: Option<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(token)),
        }
    }

    pub fn set(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(token.into());
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }
}

impl TokenStore for SharedToken {
    fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Thin JSON-over-HTTP client for the back-office API.
///
/// Cloning is cheap; clones share the connection pool and token store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client whose token store starts with the configured token.
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        Self::with_token_store(config, Arc::new(SharedToken::new(config.token.clone())))
    }

    pub fn with_token_store(
        config: &ClientConfig,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, ServiceError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ServiceError::invalid_request(format!("invalid API base URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::invalid_request(format!(
                "API base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ServiceError::invalid_request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}{path}/{segment}/...`; segments are percent-encoded.
    pub fn endpoint(&self, path: &str, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url.path_segments_mut().map_err(|_| {
                ServiceError::invalid_request(format!(
                    "API base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?;
            parts.pop_if_empty();
            parts.extend(path.split('/').filter(|p| !p.is_empty()));
            parts.extend(segments);
        }
        Ok(url)
    }

    pub async fn get(
        &self,
        url: Url,
        query: &[(String, String)],
        fallback: &str,
    ) -> Result<Value, ServiceError> {
        self.execute(Method::GET, url, query, None, fallback).await
    }

    pub async fn post(&self, url: Url, body: &Value, fallback: &str) -> Result<Value, ServiceError> {
        self.execute(Method::POST, url, &[], Some(body), fallback)
            .await
    }

    pub async fn put(&self, url: Url, body: &Value, fallback: &str) -> Result<Value, ServiceError> {
        self.execute(Method::PUT, url, &[], Some(body), fallback)
            .await
    }

    pub async fn delete(&self, url: Url, fallback: &str) -> Result<Value, ServiceError> {
        self.execute(Method::DELETE, url, &[], None, fallback).await
    }

    /// Send one request and return its JSON body (`Null` when empty).
    ///
    /// `fallback` is the message used when the server does not provide one.
    pub async fn execute(
        &self,
        method: Method,
        url: Url,
        query: &[(String, String)],
        body: Option<&Value>,
        fallback: &str,
    ) -> Result<Value, ServiceError> {
        let request_id = Uuid::now_v7();
        let path = url.path().to_string();

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = self.tokens.access_token() {
            request = request.bearer_auth(token);
        }

        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, fallback))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(e, fallback))?;

        tracing::debug!(
            %method,
            %path,
            %request_id,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "api request completed"
        );

        let parsed = if text.trim().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_str::<Value>(&text)
        };

        if status == StatusCode::UNAUTHORIZED {
            let message = parsed
                .as_ref()
                .ok()
                .and_then(extract_message)
                .unwrap_or_else(|| fallback.to_string());
            return Err(ServiceError::Unauthorized { message });
        }

        if !status.is_success() {
            let message = parsed
                .as_ref()
                .ok()
                .and_then(extract_message)
                .unwrap_or_else(|| fallback.to_string());
            tracing::debug!(%path, status = status.as_u16(), %message, "api request rejected");
            return Err(ServiceError::api(status.as_u16(), message));
        }

        let value = parsed.map_err(|e| ServiceError::Decode {
            message: fallback.to_string(),
            detail: format!("response is not JSON: {e}"),
        })?;

        // Some endpoints answer 200 with `{ success: false, message }`.
        if value.get("success") == Some(&Value::Bool(false)) {
            let message = extract_message(&value).unwrap_or_else(|| fallback.to_string());
            return Err(ServiceError::api(status.as_u16(), message));
        }

        Ok(value)
    }
}

fn transport_error(err: reqwest::Error, fallback: &str) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout {
            message: fallback.to_string(),
            detail: err.to_string(),
        }
    } else {
        ServiceError::Network {
            message: fallback.to_string(),
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ClientConfig::new(base)).unwrap()
    }

    #[test]
    fn endpoint_joins_base_path_and_segments() {
        let api = client("http://localhost:5000/api");
        let url = api.endpoint("/private/products", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/private/products");

        let url = api.endpoint("/private/products", &["p 1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/private/products/p%201");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash_on_base() {
        let api = client("http://localhost:5000/api/");
        let url = api.endpoint("/private/customers", &["c1", "addresses"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/private/customers/c1/addresses"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ApiClient::new(&ClientConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest { .. }));
    }

    #[test]
    fn shared_token_can_be_replaced_and_cleared() {
        let token = SharedToken::new(Some("first".into()));
        assert_eq!(token.access_token().as_deref(), Some("first"));

        token.set("second");
        assert_eq!(token.access_token().as_deref(), Some("second"));

        token.clear();
        assert_eq!(token.access_token(), None);

        token.set("   ");
        assert_eq!(token.access_token(), None);
    }
}
