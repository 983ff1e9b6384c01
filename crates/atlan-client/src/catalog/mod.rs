//! Catalog connectors: the REST client and an in-memory mock.

pub mod atlan;
pub mod mock;
pub mod tag_cache;

pub use atlan::{AtlanConfig, AtlanConnector, ENV_API_KEY, ENV_BASE_URL};
pub use mock::MockCatalogConnector;
pub use tag_cache::{AtlanTagCache, DELETED_TAG_NAME};
