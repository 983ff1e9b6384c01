//! Cognite industrial-data assets.

use super::{child_of, AssetKind, Parent};
use crate::model::{attr, qualified_name};
use crate::traits::AtlanResult;

const ASSET_QUALIFIED_NAME: &str = "cogniteAssetQualifiedName";
const ASSET_NAME: &str = "cogniteAssetName";

asset_type!(
    CogniteAsset,
    "CogniteAsset",
    ["Cognite", "SaaS", "Catalog", "Asset", "Referenceable"]
);

asset_type!(
    /// A file attached to a Cognite asset.
    CogniteFile,
    "CogniteFile",
    ["Cognite", "SaaS", "Catalog", "Asset", "Referenceable"]
);

impl CogniteAsset {
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

impl CogniteFile {
    pub fn creator(name: &str, asset_qualified_name: &str) -> AtlanResult<Self> {
        child_of(
            Self::TYPE_NAME,
            name,
            Parent {
                type_name: CogniteAsset::TYPE_NAME,
                relationship: Some("cogniteAsset"),
                name_attr: Some(ASSET_NAME),
                qualified_name_attr: ASSET_QUALIFIED_NAME,
                depth: qualified_name::CONNECTION_DEPTH + 1,
                qualified_name: asset_qualified_name,
            },
        )
        .map(Self)
    }

    pub fn with_mime_type(self, mime_type: &str) -> Self {
        self.with_attribute("cogniteFileMimeType", mime_type)
    }

    pub fn asset_qualified_name(&self) -> Option<&str> {
        self.str_attribute(ASSET_QUALIFIED_NAME)
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.str_attribute("cogniteFileMimeType")
    }
}
