//! Descriptors for the JSON envelopes the backend wraps its payloads in.
//!
//! Endpoints disagree on where they put things: products answer with
//! `{ data: { items, total, ... } }`, inventory with `{ inventory: [...], pagination }`,
//! RFQs with `{ data: { rfqs, pagination } }`. Each resource declares its shape
//! once; the client's normalization layer is the only code that reads it.

use serde_json::Value;

/// A path of object keys from the response root (`&[]` is the root itself).
pub type JsonPath = &'static [&'static str];

/// Where an endpoint keeps its collection, pagination and entity payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeShape {
    /// Path to the array of items in a list response.
    pub collection: JsonPath,
    /// Candidate locations of the pagination object, tried in order.
    pub pagination: &'static [JsonPath],
    /// Path to the entity in a single-entity response.
    pub entity: JsonPath,
}

const DEFAULT_PAGINATION: &[JsonPath] = &[&["data", "pagination"], &["pagination"], &["data"], &[]];

impl EnvelopeShape {
    /// `{ data: { items: [...], total, page, limit, totalPages } }` / `{ data: {...} }`.
    pub const DEFAULT: EnvelopeShape = EnvelopeShape {
        collection: &["data", "items"],
        pagination: DEFAULT_PAGINATION,
        entity: &["data"],
    };

    /// Shape whose collection lives under the given path and entity under `entity`.
    pub const fn keyed(collection: JsonPath, entity: JsonPath) -> Self {
        Self {
            collection,
            pagination: DEFAULT_PAGINATION,
            entity,
        }
    }

    /// Override the candidate pagination locations.
    pub const fn with_pagination(mut self, pagination: &'static [JsonPath]) -> Self {
        self.pagination = pagination;
        self
    }
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Follow `path` from `root`, returning `None` as soon as a key is missing.
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(*key))
}

/// Render a path for log and error messages (`data.items`, `<root>`).
pub fn display_path(path: &[&str]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
