//! Errors surfaced by the Resource Service layer.
//!
//! Every variant carries a human-readable `message` (what a screen shows in
//! its alert or toast). Transport and decoding details go into `detail` for
//! logs only; a raw `reqwest`/`serde_json` error never reaches callers.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Connection refused, DNS failure, reset, ...
    #[error("{message}")]
    Network { message: String, detail: String },

    /// The per-request timeout elapsed.
    #[error("{message}")]
    Timeout { message: String, detail: String },

    /// The server answered with a non-2xx status (or `success: false`).
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 401: the session is gone. Not retried here.
    #[error("{message}")]
    Unauthorized { message: String },

    /// The response did not have the envelope this endpoint is declared to use.
    #[error("{message}")]
    Normalization { message: String, detail: String },

    /// The payload was found but did not decode into the resource type.
    #[error("{message}")]
    Decode { message: String, detail: String },

    /// The request could not be built (empty id, malformed base URL, ...).
    #[error("{message}")]
    InvalidRequest { message: String },
}

impl ServiceError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Network { message, .. }
            | ServiceError::Timeout { message, .. }
            | ServiceError::Api { message, .. }
            | ServiceError::Unauthorized { message }
            | ServiceError::Normalization { message, .. }
            | ServiceError::Decode { message, .. }
            | ServiceError::InvalidRequest { message } => message,
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Api { status, .. } => Some(*status),
            ServiceError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    /// Whether the query layer may retry the call.
    ///
    /// Transport failures and 5xx are transient; 4xx (validation, not found,
    /// unauthorized) and malformed payloads are not going to change on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Network { .. } | ServiceError::Timeout { .. } => true,
            ServiceError::Api { status, .. } => *status >= 500 || *status == 429,
            ServiceError::Unauthorized { .. }
            | ServiceError::Normalization { .. }
            | ServiceError::Decode { .. }
            | ServiceError::InvalidRequest { .. } => false,
        }
    }
}

/// Resource operation, used to pick fallback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Fallback message when the server gives none, e.g. "Failed to fetch products".
    ///
    /// `name` is the plural resource name (`refund-transactions`), `label` the
    /// singular label (`Refund transaction`).
    pub fn fallback_message(&self, name: &str, label: &str) -> String {
        let label = label.to_lowercase();
        match self {
            Operation::List => format!("Failed to fetch {}", name.replace('-', " ")),
            Operation::Get => format!("Failed to fetch {label}"),
            Operation::Create => format!("Failed to create {label}"),
            Operation::Update => format!("Failed to update {label}"),
            Operation::Delete => format!("Failed to delete {label}"),
        }
    }
}
