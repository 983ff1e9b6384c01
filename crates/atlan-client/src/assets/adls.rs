//! Azure Data Lake Storage assets.

use super::{child_of, set_ancestor, AssetKind, Parent};
use crate::model::{attr, qualified_name, ADLSAccessTier};
use crate::traits::AtlanResult;

const ACCOUNT_NAME: &str = "adlsAccountName";
const ACCOUNT_QUALIFIED_NAME: &str = "adlsAccountQualifiedName";
const CONTAINER_NAME: &str = "adlsContainerName";
const CONTAINER_QUALIFIED_NAME: &str = "adlsContainerQualifiedName";
const OBJECT_URL: &str = "adlsObjectUrl";
const OBJECT_SIZE: &str = "adlsObjectSize";
const OBJECT_ACCESS_TIER: &str = "adlsObjectAccessTier";
const OBJECT_CONTENT_TYPE: &str = "adlsObjectContentType";

asset_type!(
    /// A storage account.
    ADLSAccount,
    "ADLSAccount",
    ["ADLS", "ObjectStore", "Azure", "Cloud", "Catalog", "Asset", "Referenceable"]
);

asset_type!(
    /// A container within a storage account.
    ADLSContainer,
    "ADLSContainer",
    ["ADLS", "ObjectStore", "Azure", "Cloud", "Catalog", "Asset", "Referenceable"]
);

asset_type!(
    /// A blob or file within a container.
    ADLSObject,
    "ADLSObject",
    ["ADLS", "ObjectStore", "Azure", "Cloud", "Catalog", "Asset", "Referenceable"]
);

impl ADLSAccount {
    pub fn creator(name: &str, connection_qualified_name: &str) -> AtlanResult<Self> {
        child_of(
            Self::TYPE_NAME,
            name,
            Parent {
                type_name: "Connection",
                relationship: None,
                name_attr: None,
                qualified_name_attr: attr::CONNECTION_QUALIFIED_NAME,
                depth: qualified_name::CONNECTION_DEPTH,
                qualified_name: connection_qualified_name,
            },
        )
        .map(Self)
    }
}

impl ADLSContainer {
    pub fn creator(name: &str, account_qualified_name: &str) -> AtlanResult<Self> {
        child_of(
            Self::TYPE_NAME,
            name,
            Parent {
                type_name: ADLSAccount::TYPE_NAME,
                relationship: Some("adlsAccount"),
                name_attr: Some(ACCOUNT_NAME),
                qualified_name_attr: ACCOUNT_QUALIFIED_NAME,
                depth: qualified_name::CONNECTION_DEPTH + 1,
                qualified_name: account_qualified_name,
            },
        )
        .map(Self)
    }

    pub fn account_qualified_name(&self) -> Option<&str> {
        self.str_attribute(ACCOUNT_QUALIFIED_NAME)
    }
}

impl ADLSObject {
    pub fn creator(name: &str, container_qualified_name: &str) -> AtlanResult<Self> {
        let mut asset = child_of(
            Self::TYPE_NAME,
            name,
            Parent {
                type_name: ADLSContainer::TYPE_NAME,
                relationship: Some("adlsContainer"),
                name_attr: Some(CONTAINER_NAME),
                qualified_name_attr: CONTAINER_QUALIFIED_NAME,
                depth: qualified_name::CONNECTION_DEPTH + 2,
                qualified_name: container_qualified_name,
            },
        )?;
        if let Some(account) = qualified_name::parent_of(container_qualified_name) {
            set_ancestor(&mut asset, ACCOUNT_NAME, ACCOUNT_QUALIFIED_NAME, account);
        }
        Ok(Self(asset))
    }

    pub fn with_url(self, url: &str) -> Self {
        self.with_attribute(OBJECT_URL, url)
    }

    pub fn with_size(self, bytes: i64) -> Self {
        self.with_attribute(OBJECT_SIZE, bytes)
    }

    pub fn with_access_tier(self, tier: ADLSAccessTier) -> Self {
        let value = serde_json::to_value(tier).unwrap_or_default();
        self.with_attribute(OBJECT_ACCESS_TIER, value)
    }

    pub fn with_content_type(self, content_type: &str) -> Self {
        self.with_attribute(OBJECT_CONTENT_TYPE, content_type)
    }

    pub fn container_qualified_name(&self) -> Option<&str> {
        self.str_attribute(CONTAINER_QUALIFIED_NAME)
    }

    pub fn account_qualified_name(&self) -> Option<&str> {
        self.str_attribute(ACCOUNT_QUALIFIED_NAME)
    }

    pub fn url(&self) -> Option<&str> {
        self.str_attribute(OBJECT_URL)
    }

    pub fn size(&self) -> Option<i64> {
        self.i64_attribute(OBJECT_SIZE)
    }

    pub fn access_tier(&self) -> Option<ADLSAccessTier> {
        self.attribute(OBJECT_ACCESS_TIER)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.str_attribute(OBJECT_CONTENT_TYPE)
    }
}
