//! Enumerations shared by assets and requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Active,
    /// Archived (soft-deleted); can be restored.
    Deleted,
    Purged,
}

impl EntityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "ACTIVE",
            EntityStatus::Deleted => "DELETED",
            EntityStatus::Purged => "PURGED",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certification applied to an asset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Verified,
    Draft,
    Deprecated,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Verified => "VERIFIED",
            CertificateStatus::Draft => "DRAFT",
            CertificateStatus::Deprecated => "DEPRECATED",
        }
    }
}

impl FromStr for CertificateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "VERIFIED" => Ok(CertificateStatus::Verified),
            "DRAFT" => Ok(CertificateStatus::Draft),
            "DEPRECATED" => Ok(CertificateStatus::Deprecated),
            _ => Err(format!("Invalid certificate status: {}", s)),
        }
    }
}

/// Kind of announcement banner shown on an asset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementType {
    Information,
    Warning,
    Issue,
}

impl AnnouncementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementType::Information => "information",
            AnnouncementType::Warning => "warning",
            AnnouncementType::Issue => "issue",
        }
    }
}

/// How assets are removed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeleteType {
    /// Archive: the asset moves to `DELETED` and can be restored.
    Soft,
    /// Purge: the asset is removed permanently.
    Hard,
}

impl DeleteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteType::Soft => "SOFT",
            DeleteType::Hard => "HARD",
        }
    }
}

/// Access tier of an ADLS object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ADLSAccessTier {
    Hot,
    Cool,
    Archive,
}

/// Broad category of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorCategory {
    Warehouse,
    Database,
    ObjectStore,
    Bi,
    SaaS,
    Lake,
    Custom,
}

impl ConnectorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorCategory::Warehouse => "warehouse",
            ConnectorCategory::Database => "database",
            ConnectorCategory::ObjectStore => "object-store",
            ConnectorCategory::Bi => "bi",
            ConnectorCategory::SaaS => "saas",
            ConnectorCategory::Lake => "lake",
            ConnectorCategory::Custom => "custom",
        }
    }
}

/// Source system a connection points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtlanConnectorType {
    Snowflake,
    Databricks,
    Postgres,
    BigQuery,
    Redshift,
    Adls,
    S3,
    Anaplan,
    Cognite,
    Tableau,
    PowerBi,
    Api,
}

impl AtlanConnectorType {
    const ALL: [AtlanConnectorType; 12] = [
        AtlanConnectorType::Snowflake,
        AtlanConnectorType::Databricks,
        AtlanConnectorType::Postgres,
        AtlanConnectorType::BigQuery,
        AtlanConnectorType::Redshift,
        AtlanConnectorType::Adls,
        AtlanConnectorType::S3,
        AtlanConnectorType::Anaplan,
        AtlanConnectorType::Cognite,
        AtlanConnectorType::Tableau,
        AtlanConnectorType::PowerBi,
        AtlanConnectorType::Api,
    ];

    /// The value used in qualified names and the `connectorName` attribute.
    pub fn value(&self) -> &'static str {
        match self {
            AtlanConnectorType::Snowflake => "snowflake",
            AtlanConnectorType::Databricks => "databricks",
            AtlanConnectorType::Postgres => "postgres",
            AtlanConnectorType::BigQuery => "bigquery",
            AtlanConnectorType::Redshift => "redshift",
            AtlanConnectorType::Adls => "adls",
            AtlanConnectorType::S3 => "s3",
            AtlanConnectorType::Anaplan => "anaplan",
            AtlanConnectorType::Cognite => "cognite",
            AtlanConnectorType::Tableau => "tableau",
            AtlanConnectorType::PowerBi => "powerbi",
            AtlanConnectorType::Api => "api",
        }
    }

    pub fn category(&self) -> ConnectorCategory {
        match self {
            AtlanConnectorType::Snowflake
            | AtlanConnectorType::BigQuery
            | AtlanConnectorType::Redshift => ConnectorCategory::Warehouse,
            AtlanConnectorType::Postgres => ConnectorCategory::Database,
            AtlanConnectorType::Databricks => ConnectorCategory::Lake,
            AtlanConnectorType::Adls | AtlanConnectorType::S3 => ConnectorCategory::ObjectStore,
            AtlanConnectorType::Anaplan
            | AtlanConnectorType::Tableau
            | AtlanConnectorType::PowerBi => ConnectorCategory::Bi,
            AtlanConnectorType::Cognite => ConnectorCategory::SaaS,
            AtlanConnectorType::Api => ConnectorCategory::Custom,
        }
    }

    /// Parses the connector from a qualified name of the form
    /// `default/<connector>/<epoch>[/...]`.
    pub fn from_qualified_name(qualified_name: &str) -> Option<Self> {
        let mut parts = qualified_name.split('/');
        let _tenant = parts.next()?;
        parts.next().and_then(|value| value.parse().ok())
    }
}

impl FromStr for AtlanConnectorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|c| c.value() == s)
            .copied()
            .ok_or_else(|| format!("Unknown connector type: {}", s))
    }
}

impl fmt::Display for AtlanConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_from_qualified_name() {
        assert_eq!(
            AtlanConnectorType::from_qualified_name("default/snowflake/1700000000/DB/SCH"),
            Some(AtlanConnectorType::Snowflake)
        );
        assert_eq!(
            AtlanConnectorType::from_qualified_name("default/adls/1700000000"),
            Some(AtlanConnectorType::Adls)
        );
        assert_eq!(AtlanConnectorType::from_qualified_name("default"), None);
        assert_eq!(
            AtlanConnectorType::from_qualified_name("default/unknown/1"),
            None
        );
    }

    #[test]
    fn test_connector_category() {
        assert_eq!(
            AtlanConnectorType::Anaplan.category(),
            ConnectorCategory::Bi
        );
        assert_eq!(
            AtlanConnectorType::Adls.category().as_str(),
            "object-store"
        );
    }

    #[test]
    fn test_certificate_status_parsing() {
        assert_eq!(
            "verified".parse::<CertificateStatus>().unwrap(),
            CertificateStatus::Verified
        );
        assert!("approved".parse::<CertificateStatus>().is_err());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&EntityStatus::Deleted).unwrap(),
            "\"DELETED\""
        );
        assert_eq!(
            serde_json::to_string(&AnnouncementType::Warning).unwrap(),
            "\"warning\""
        );
    }
}
