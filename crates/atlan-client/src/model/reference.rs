//! Minimal pointers to assets, used in relationships and request payloads.

use super::enums::EntityStatus;
use serde::{Deserialize, Serialize};

/// Unique-attribute block of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
}

/// Reference to another asset by GUID or by qualified name.
///
/// Read responses also carry `displayText` and `entityStatus`; both are
/// dropped when the reference is sent back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_attributes: Option<UniqueAttributes>,
    #[serde(default, skip_serializing)]
    pub display_text: Option<String>,
    #[serde(default, skip_serializing)]
    pub entity_status: Option<EntityStatus>,
}

impl AssetRef {
    pub fn by_guid(type_name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            guid: Some(guid.into()),
            unique_attributes: None,
            display_text: None,
            entity_status: None,
        }
    }

    pub fn by_qualified_name(
        type_name: impl Into<String>,
        qualified_name: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            guid: None,
            unique_attributes: Some(UniqueAttributes {
                qualified_name: Some(qualified_name.into()),
            }),
            display_text: None,
            entity_status: None,
        }
    }

    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref().filter(|g| !g.is_empty())
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.unique_attributes
            .as_ref()
            .and_then(|u| u.qualified_name.as_deref())
            .filter(|q| !q.is_empty())
    }

    /// Whether both references point at the same asset.
    ///
    /// GUIDs are compared when both sides have one, qualified names otherwise.
    pub fn same_target(&self, other: &AssetRef) -> bool {
        match (self.guid(), other.guid()) {
            (Some(a), Some(b)) => a == b,
            _ => match (self.qualified_name(), other.qualified_name()) {
                (Some(a), Some(b)) => a == b && self.type_name == other.type_name,
                _ => false,
            },
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.entity_status, Some(EntityStatus::Deleted))
    }
}
