//! Anaplan planning assets.

use super::{child_of, set_ancestor, AssetKind, Parent};
use crate::model::{attr, qualified_name};
use crate::traits::AtlanResult;

const WORKSPACE_NAME: &str = "anaplanWorkspaceName";
const WORKSPACE_QUALIFIED_NAME: &str = "anaplanWorkspaceQualifiedName";
const MODEL_NAME: &str = "anaplanModelName";
const MODEL_QUALIFIED_NAME: &str = "anaplanModelQualifiedName";
const SOURCE_ID: &str = "anaplanSourceId";
const LIST_ITEM_COUNT: &str = "anaplanListItemCount";

asset_type!(
    AnaplanWorkspace,
    "AnaplanWorkspace",
    ["Anaplan", "BI", "Catalog", "Asset", "Referenceable"]
);

asset_type!(
    AnaplanModel,
    "AnaplanModel",
    ["Anaplan", "BI", "Catalog", "Asset", "Referenceable"]
);

asset_type!(
    /// A list of items within an Anaplan model.
    AnaplanList,
    "AnaplanList",
    ["Anaplan", "BI", "Catalog", "Asset", "Referenceable"]
);

impl AnaplanWorkspace {
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

    pub fn with_source_id(self, id: &str) -> Self {
        self.with_attribute(SOURCE_ID, id)
    }

    pub fn source_id(&self) -> Option<&str> {
        self.str_attribute(SOURCE_ID)
    }
}

impl AnaplanModel {
    pub fn creator(name: &str, workspace_qualified_name: &str) -> AtlanResult<Self> {
        child_of(
            Self::TYPE_NAME,
            name,
            Parent {
                type_name: AnaplanWorkspace::TYPE_NAME,
                relationship: Some("anaplanWorkspace"),
                name_attr: Some(WORKSPACE_NAME),
                qualified_name_attr: WORKSPACE_QUALIFIED_NAME,
                depth: qualified_name::CONNECTION_DEPTH + 1,
                qualified_name: workspace_qualified_name,
            },
        )
        .map(Self)
    }

    pub fn workspace_qualified_name(&self) -> Option<&str> {
        self.str_attribute(WORKSPACE_QUALIFIED_NAME)
    }
}

impl AnaplanList {
    pub fn creator(name: &str, model_qualified_name: &str) -> AtlanResult<Self> {
        let mut asset = child_of(
            Self::TYPE_NAME,
            name,
            Parent {
                type_name: AnaplanModel::TYPE_NAME,
                relationship: Some("anaplanModel"),
                name_attr: Some(MODEL_NAME),
                qualified_name_attr: MODEL_QUALIFIED_NAME,
                depth: qualified_name::CONNECTION_DEPTH + 2,
                qualified_name: model_qualified_name,
            },
        )?;
        if let Some(workspace) = qualified_name::parent_of(model_qualified_name) {
            set_ancestor(&mut asset, WORKSPACE_NAME, WORKSPACE_QUALIFIED_NAME, workspace);
        }
        Ok(Self(asset))
    }

    pub fn with_item_count(self, count: i64) -> Self {
        self.with_attribute(LIST_ITEM_COUNT, count)
    }

    pub fn model_qualified_name(&self) -> Option<&str> {
        self.str_attribute(MODEL_QUALIFIED_NAME)
    }

    pub fn workspace_qualified_name(&self) -> Option<&str> {
        self.str_attribute(WORKSPACE_QUALIFIED_NAME)
    }

    pub fn item_count(&self) -> Option<i64> {
        self.i64_attribute(LIST_ITEM_COUNT)
    }
}
