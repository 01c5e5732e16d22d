//! Entity and resource traits.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::envelope::EnvelopeShape;
use crate::id::ResourceId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// A domain entity exposed by the backend through REST CRUD endpoints.
///
/// The associated constants are the only per-resource knowledge the generic
/// service, cache and table layers need:
///
/// - `NAME` is the cache namespace; every cache key for this resource starts
///   with it, and mutations invalidate by it.
/// - `LABEL` is the human-readable singular used in notifications.
/// - `PATH` is the collection endpoint relative to the API base URL.
/// - `ENVELOPE` tells the normalization layer where this endpoint puts its
///   collection, pagination metadata and single-entity payload.
pub trait Resource:
    Entity<Id = ResourceId> + Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    const NAME: &'static str;
    const LABEL: &'static str;
    const PATH: &'static str;
    const ENVELOPE: EnvelopeShape = EnvelopeShape::DEFAULT;

    /// Lower-cased label for fallback error messages ("Failed to fetch products").
    fn label_lower() -> String {
        Self::LABEL.to_lowercase()
    }
}
