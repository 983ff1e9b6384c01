//! Testing harness for catalog code.
//!
//! Config builders, a small sample catalog and assertion helpers shared by
//! unit and integration tests.

use crate::assets::{AssetKind, Column, Connection, Database, Schema, Table, View};
use crate::catalog::{AtlanConfig, MockCatalogConnector};
use crate::model::{Asset, AtlanConnectorType};
use crate::traits::{AtlanError, AtlanResult, AuthConfig, ClientConfig, ConnectorHealth};
use chrono::DateTime;
use std::collections::HashMap;

/// Qualified name of the sample connection.
pub const SAMPLE_CONNECTION_QN: &str = "default/snowflake/1700000000";

/// Creates a client config with no auth and no retries.
pub fn test_client_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        name: "test".to_string(),
        base_url: base_url.to_string(),
        auth: AuthConfig::None,
        timeout_secs: 5,
        max_retries: 0,
        verify_tls: true,
        headers: HashMap::new(),
    }
}

/// Creates a client config authenticating with an API token.
pub fn test_client_config_with_token(base_url: &str, token: &str) -> ClientConfig {
    ClientConfig {
        auth: AuthConfig::ApiToken {
            token: crate::SecureString::new(token.to_string()),
        },
        ..test_client_config(base_url)
    }
}

/// Atlan connector config pointing at a test server.
pub fn test_atlan_config(base_url: &str, token: &str) -> AtlanConfig {
    let mut config = AtlanConfig::new(base_url, token);
    config.client = test_client_config_with_token(base_url, token);
    config.tag_cache_ttl_secs = 60;
    config
}

/// A connection with one database, schema, two tables, a view and a column.
#[derive(Debug, Clone)]
pub struct SampleCatalog {
    pub connection: Connection,
    pub database: Database,
    pub schema: Schema,
    pub tables: Vec<Table>,
    pub view: View,
    pub column: Column,
}

impl SampleCatalog {
    /// Every sample asset, parents before children.
    pub fn assets(&self) -> Vec<Asset> {
        let mut assets = vec![
            self.connection.as_asset().clone(),
            self.database.as_asset().clone(),
            self.schema.as_asset().clone(),
        ];
        assets.extend(self.tables.iter().map(|t| t.as_asset().clone()));
        assets.push(self.view.as_asset().clone());
        assets.push(self.column.as_asset().clone());
        assets
    }

    /// A mock connector holding the sample assets.
    pub fn mock(&self) -> MockCatalogConnector {
        MockCatalogConnector::with_assets("sample", self.assets())
    }
}

pub fn sample_catalog() -> AtlanResult<SampleCatalog> {
    let created = DateTime::from_timestamp(1_700_000_000, 0)
        .ok_or_else(|| AtlanError::Internal("Invalid sample timestamp".to_string()))?;
    let connection = Connection::creator_at(
        "production",
        AtlanConnectorType::Snowflake,
        &["$admin"],
        &[],
        &[],
        created,
    )?;
    let database = Database::creator("ANALYTICS", SAMPLE_CONNECTION_QN)?;
    let schema = Schema::creator("SALES", database.qualified_name().unwrap_or_default())?;
    let schema_qn = schema.qualified_name().unwrap_or_default().to_string();
    let tables = vec![
        Table::creator("ORDERS", &schema_qn)?
            .with_description("Raw orders")
            .with_owner_users(["jo"]),
        Table::creator("CUSTOMERS", &schema_qn)?.with_owner_users(["sam"]),
    ];
    let view = View::creator("DAILY_REVENUE", &schema_qn)?;
    let column = Column::creator(
        "ORDER_ID",
        Table::TYPE_NAME,
        tables[0].qualified_name().unwrap_or_default(),
        1,
    )?;

    Ok(SampleCatalog {
        connection,
        database,
        schema,
        tables,
        view,
        column,
    })
}

/// Asserts that a connector health check returns healthy.
pub fn assert_healthy(result: &AtlanResult<ConnectorHealth>) {
    match result {
        Ok(ConnectorHealth::Healthy) => {}
        other => panic!("Expected Healthy, got {:?}", other),
    }
}

/// Asserts that a connector health check returns unhealthy.
pub fn assert_unhealthy(result: &AtlanResult<ConnectorHealth>) {
    match result {
        Ok(ConnectorHealth::Unhealthy(_)) => {}
        other => panic!("Expected Unhealthy, got {:?}", other),
    }
}

pub fn assert_not_found<T: std::fmt::Debug>(result: &AtlanResult<T>) {
    match result {
        Err(AtlanError::NotFound(_)) => {}
        other => panic!("Expected NotFound error, got {:?}", other),
    }
}

pub fn assert_invalid_request<T: std::fmt::Debug>(result: &AtlanResult<T>) {
    match result {
        Err(AtlanError::InvalidRequest(_)) => {}
        other => panic!("Expected InvalidRequest error, got {:?}", other),
    }
}
