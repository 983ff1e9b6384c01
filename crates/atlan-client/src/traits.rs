//! Connector interface for the Atlan catalog.
//!
//! Defines the error taxonomy, client configuration and the operations every
//! catalog connector provides. Typed assets and the fluent search only ever
//! talk to a `&dyn CatalogConnector`, so the HTTP connector and the in-memory
//! mock are interchangeable.

use crate::model::{Asset, DeleteType, MutationResponse, TypeDefCategory, TypeDefResponse};
use crate::search::{IndexSearchRequest, IndexSearchResponse};
use crate::secure_string::SecureString;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by catalog operations.
#[derive(Error, Debug, Clone)]
pub enum AtlanError {
    /// The asset, type or tag does not exist (or is not of the requested type).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request is missing required fields or is otherwise malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u64),

    #[error("Unable to reach the API: {0}")]
    ApiConnection(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Any other failure reported by the API.
    #[error("API error: {0}")]
    Api(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AtlanError {
    pub fn asset_not_found_by_guid(guid: &str) -> Self {
        AtlanError::NotFound(format!("Asset with GUID {} does not exist", guid))
    }

    pub fn asset_not_found_by_qualified_name(type_name: &str, qualified_name: &str) -> Self {
        AtlanError::NotFound(format!(
            "Asset with qualifiedName {} of type {} does not exist",
            qualified_name, type_name
        ))
    }

    pub fn asset_not_type_requested(id: &str, expected: &str, actual: &str) -> Self {
        AtlanError::NotFound(format!(
            "Asset {} is of type {}, not the type requested: {}",
            id, actual, expected
        ))
    }

    pub fn missing_reference_identity(type_name: &str) -> Self {
        AtlanError::InvalidRequest(format!(
            "Reference object {} requires either a GUID or qualifiedName",
            type_name
        ))
    }

    pub fn missing_parameters(type_name: &str, names: &[&str]) -> Self {
        AtlanError::InvalidRequest(format!(
            "Missing required parameter(s) for {}: {}",
            type_name,
            names.join(", ")
        ))
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AtlanError::NotFound(_) => "not_found",
            AtlanError::InvalidRequest(_) => "invalid_request",
            AtlanError::Authentication(_) => "authentication",
            AtlanError::Permission(_) => "permission",
            AtlanError::Conflict(_) => "conflict",
            AtlanError::RateLimited(_) => "rate_limited",
            AtlanError::ApiConnection(_) => "api_connection",
            AtlanError::Timeout(_) => "timeout",
            AtlanError::InvalidResponse(_) => "invalid_response",
            AtlanError::Configuration(_) => "configuration",
            AtlanError::Api(_) => "api",
            AtlanError::Internal(_) => "internal",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AtlanError::NotFound(_))
    }
}

/// Result type for catalog operations.
pub type AtlanResult<T> = Result<T, AtlanError>;

/// Health status of a connector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorHealth {
    Healthy,
    Degraded(String),
    Unhealthy(String),
    Unknown,
}

/// Transport configuration for a connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Connector name, used in logs.
    pub name: String,
    /// Tenant URL, e.g. `https://tenant.atlan.com`.
    pub base_url: String,
    pub auth: AuthConfig,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_true")]
    pub verify_tls: bool,
    /// Extra headers sent on every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    None,
    /// API token sent as a bearer token.
    ApiToken { token: SecureString },
    /// OAuth2 client credentials exchanged for short-lived bearer tokens.
    #[serde(rename = "oauth2")]
    OAuth2 {
        client_id: String,
        client_secret: SecureString,
        token_url: String,
        #[serde(default)]
        scopes: Vec<String>,
    },
}

/// Options controlling how a save treats tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Replace the asset's tags with exactly those sent.
    pub replace_atlan_tags: bool,
    /// Add the tags sent to those already on the asset.
    pub append_atlan_tags: bool,
}

impl SaveOptions {
    pub fn replacing_tags() -> Self {
        Self {
            replace_atlan_tags: true,
            append_atlan_tags: false,
        }
    }

    pub fn appending_tags() -> Self {
        Self {
            replace_atlan_tags: false,
            append_atlan_tags: true,
        }
    }
}

/// Base trait for all connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    fn name(&self) -> &str;

    /// Kind of backend ("atlan", "mock").
    fn connector_type(&self) -> &str;

    fn capabilities(&self) -> Vec<String> {
        vec!["health_check".to_string(), "test_connection".to_string()]
    }

    async fn health_check(&self) -> AtlanResult<ConnectorHealth>;

    async fn test_connection(&self) -> AtlanResult<bool>;
}

/// Operations against a metadata catalog.
#[async_trait]
pub trait CatalogConnector: Connector {
    /// Fetches an asset by GUID.
    ///
    /// `min_ext_info` skips extended information about referred entities;
    /// `ignore_relationships` skips relationship attributes entirely.
    async fn get_by_guid(
        &self,
        guid: &str,
        min_ext_info: bool,
        ignore_relationships: bool,
    ) -> AtlanResult<Asset>;

    /// Fetches an asset by type and qualified name.
    async fn get_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
        min_ext_info: bool,
        ignore_relationships: bool,
    ) -> AtlanResult<Asset>;

    /// Creates or updates assets. Assets are matched on GUID, then on
    /// type and qualified name; unmatched assets are created.
    async fn save(
        &self,
        assets: Vec<Asset>,
        options: SaveOptions,
    ) -> AtlanResult<MutationResponse>;

    /// Archives (`Soft`) or purges (`Hard`) assets.
    async fn delete(
        &self,
        guids: &[String],
        delete_type: DeleteType,
    ) -> AtlanResult<MutationResponse>;

    /// Restores archived assets.
    async fn restore(&self, guids: &[String]) -> AtlanResult<MutationResponse>;

    /// Runs an index search.
    async fn search(&self, request: &IndexSearchRequest) -> AtlanResult<IndexSearchResponse>;

    /// Lists type definitions of one category.
    async fn get_typedefs(&self, category: TypeDefCategory) -> AtlanResult<TypeDefResponse>;

    /// Creates type definitions and returns them as stored.
    async fn create_typedefs(&self, typedefs: &TypeDefResponse) -> AtlanResult<TypeDefResponse>;

    /// Permanently removes a type definition by its internal name.
    async fn purge_typedef(&self, internal_name: &str) -> AtlanResult<()>;

    /// Resolves a tag's human-readable name to the identifier used in
    /// search indexes.
    async fn atlan_tag_id(&self, display_name: &str) -> AtlanResult<String>;
}
