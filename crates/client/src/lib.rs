//! `backoffice-client`: the Resource Service layer.
//!
//! **Responsibility:** translate list/get/create/update/delete into HTTP calls
//! against the back-office REST API and hand back one canonical shape per
//! operation, whatever envelope the endpoint used.
//!
//! This crate performs no caching; that is the query layer's job.

pub mod addresses;
pub mod config;
pub mod envelope;
pub mod error;
pub mod service;
pub mod transport;

pub use addresses::CustomerAddresses;
pub use config::ClientConfig;
pub use error::{Operation, ServiceError};
pub use service::{DeleteAck, ResourceApi, ResourceService};
pub use transport::{ApiClient, SharedToken, TokenStore};
