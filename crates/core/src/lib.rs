//! `backoffice-core`: shared building blocks for the back-office client.
//!
//! This crate contains **pure** types (no IO): identifiers, the resource
//! contract every REST-backed entity implements, list request/response shapes
//! and the descriptors used to normalize server envelopes.

pub mod entity;
pub mod envelope;
pub mod error;
pub mod id;
pub mod pagination;

pub use entity::{Entity, Resource};
pub use envelope::{EnvelopeShape, JsonPath};
pub use error::{DomainError, DomainResult};
pub use id::ResourceId;
pub use pagination::{DEFAULT_PAGE_SIZE, ListEnvelope, ListParams, SortOrder, total_pages};
