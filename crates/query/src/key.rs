//! Cache keys.

use std::fmt;

use backoffice_core::{ListParams, Resource, ResourceId};

/// What part of a resource a cached value covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryScope {
    /// One page of a list, identified by its request fingerprint.
    List(String),
    /// A single entity.
    Detail(ResourceId),
}

/// `(resource name, scope)`. Every key of a resource starts with its name, so
/// invalidating by name reaches all of its pages, filters and details.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    resource: String,
    scope: QueryScope,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>, scope: QueryScope) -> Self {
        Self {
            resource: resource.into(),
            scope,
        }
    }

    pub fn list<R: Resource>(params: &ListParams) -> Self {
        Self::new(R::NAME, QueryScope::List(params.cache_fingerprint()))
    }

    pub fn detail<R: Resource>(id: &ResourceId) -> Self {
        Self::new(R::NAME, QueryScope::Detail(id.clone()))
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn scope(&self) -> &QueryScope {
        &self.scope
    }

    pub fn matches_resource(&self, resource: &str) -> bool {
        self.resource == resource
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            QueryScope::List(fingerprint) => write!(f, "{}/list?{}", self.resource, fingerprint),
            QueryScope::Detail(id) => write!(f, "{}/detail/{}", self.resource, id),
        }
    }
}
