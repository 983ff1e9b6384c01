//! # atlan-client
//!
//! Client SDK for the Atlan metadata catalog.
//!
//! Typed assets build correctly-shaped entities and wrap the common
//! read-modify-write operations, the fluent search composes index-search
//! queries, and connectors carry both to a catalog: the REST connector for a
//! live tenant and an in-memory mock for tests.

pub mod assets;
pub mod catalog;
pub mod http;
pub mod model;
pub mod search;
pub mod secure_string;
pub mod testing;
pub mod traits;

pub use secure_string::SecureString;

// Re-export traits
pub use traits::{
    AtlanError, AtlanResult, AuthConfig, CatalogConnector, ClientConfig, Connector,
    ConnectorHealth, SaveOptions,
};

// Re-export connector implementations
pub use catalog::{AtlanConfig, AtlanConnector, AtlanTagCache, MockCatalogConnector};
pub use http::{HttpClient, RateLimitConfig};
