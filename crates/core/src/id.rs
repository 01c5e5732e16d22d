//! Strongly-typed identifiers used across the client.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Server-assigned identifier of a resource.
///
/// The backend hands out opaque strings (usually Mongo-style `_id` values), so
/// the client never parses them; it only compares and forwards them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty ids are what an unselected form field or a missing route param
    /// looks like; detail queries stay disabled for them.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl core::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResourceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("ResourceId: empty"));
        }
        if trimmed.contains('/') {
            return Err(DomainError::invalid_id(format!(
                "ResourceId: '{trimmed}' contains a path separator"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}
