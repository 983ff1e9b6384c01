//! Connections: the root of every asset hierarchy.

use super::AssetKind;
use crate::model::{attr, qualified_name, Asset, AtlanConnectorType};
use crate::traits::{AtlanError, AtlanResult};
use chrono::{DateTime, Utc};

asset_type!(
    /// A configured connection to a source system.
    Connection,
    "Connection",
    ["Asset", "Referenceable"]
);

impl Connection {
    /// A new connection named `name`, qualified as
    /// `default/<connector>/<epoch seconds>`.
    ///
    /// At least one admin (role, group or user) is required.
    pub fn creator(
        name: &str,
        connector_type: AtlanConnectorType,
        admin_roles: &[&str],
        admin_groups: &[&str],
        admin_users: &[&str],
    ) -> AtlanResult<Self> {
        Self::creator_at(
            name,
            connector_type,
            admin_roles,
            admin_groups,
            admin_users,
            Utc::now(),
        )
    }

    /// As [`Connection::creator`], with an explicit creation time.
    pub fn creator_at(
        name: &str,
        connector_type: AtlanConnectorType,
        admin_roles: &[&str],
        admin_groups: &[&str],
        admin_users: &[&str],
        created: DateTime<Utc>,
    ) -> AtlanResult<Self> {
        qualified_name::validate_required(Self::TYPE_NAME, &[(attr::NAME, name)])?;
        if admin_roles.is_empty() && admin_groups.is_empty() && admin_users.is_empty() {
            return Err(AtlanError::InvalidRequest(format!(
                "Connection {} requires at least one admin role, group or user",
                name
            )));
        }

        let mut asset = Asset::with_temporary_guid(Self::TYPE_NAME);
        asset.set_attribute(attr::NAME, name);
        asset.set_attribute(
            attr::QUALIFIED_NAME,
            qualified_name::connection_qualified_name(connector_type, created),
        );
        asset.set_attribute(attr::CONNECTOR_NAME, connector_type.value());
        asset.set_attribute("category", connector_type.category().as_str());
        asset.set_attribute(attr::ADMIN_ROLES, admin_roles.to_vec());
        asset.set_attribute(attr::ADMIN_GROUPS, admin_groups.to_vec());
        asset.set_attribute(attr::ADMIN_USERS, admin_users.to_vec());
        Ok(Self(asset))
    }

    pub fn with_host(self, host: &str, port: u16) -> Self {
        self.with_attribute("host", host).with_attribute("port", port)
    }

    pub fn connector_type(&self) -> Option<AtlanConnectorType> {
        self.connector_name().and_then(|c| c.parse().ok())
    }

    pub fn category(&self) -> Option<&str> {
        self.str_attribute("category")
    }

    pub fn admin_roles(&self) -> Vec<String> {
        self.string_list(attr::ADMIN_ROLES)
    }

    pub fn admin_groups(&self) -> Vec<String> {
        self.string_list(attr::ADMIN_GROUPS)
    }

    pub fn admin_users(&self) -> Vec<String> {
        self.string_list(attr::ADMIN_USERS)
    }

    pub fn host(&self) -> Option<&str> {
        self.str_attribute("host")
    }
}
