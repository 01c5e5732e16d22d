//! Domain error model.

use thiserror::Error;

/// Result type for pure (no IO) operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failure of a pure operation: bad input or a reference to something that
/// is not there. HTTP failures are `backoffice_client::ServiceError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value was rejected (negative quantity, unknown sort order).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A line or row index past the end of its collection.
    #[error("index {index} is out of range (length {len})")]
    OutOfRange { index: usize, len: usize },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }
}
