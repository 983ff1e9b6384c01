//! The catalog entity as exchanged with the API.
//!
//! Every typed asset wraps an `Asset`. Attributes live in an open map so that
//! any type's attributes round-trip; typed getters cover the common ones. An
//! explicit `null` in `attributes` clears that attribute when saved.

use super::enums::{AnnouncementType, CertificateStatus, EntityStatus};
use super::reference::{AssetRef, UniqueAttributes};
use super::tag::AtlanTag;
use crate::traits::{AtlanError, AtlanResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Attribute names used across asset types.
pub mod attr {
    pub const QUALIFIED_NAME: &str = "qualifiedName";
    pub const NAME: &str = "name";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const DESCRIPTION: &str = "description";
    pub const USER_DESCRIPTION: &str = "userDescription";
    pub const OWNER_USERS: &str = "ownerUsers";
    pub const OWNER_GROUPS: &str = "ownerGroups";
    pub const ADMIN_USERS: &str = "adminUsers";
    pub const ADMIN_GROUPS: &str = "adminGroups";
    pub const ADMIN_ROLES: &str = "adminRoles";
    pub const CERTIFICATE_STATUS: &str = "certificateStatus";
    pub const CERTIFICATE_STATUS_MESSAGE: &str = "certificateStatusMessage";
    pub const ANNOUNCEMENT_TYPE: &str = "announcementType";
    pub const ANNOUNCEMENT_TITLE: &str = "announcementTitle";
    pub const ANNOUNCEMENT_MESSAGE: &str = "announcementMessage";
    pub const CONNECTOR_NAME: &str = "connectorName";
    pub const CONNECTION_QUALIFIED_NAME: &str = "connectionQualifiedName";
    pub const MEANINGS: &str = "meanings";
    pub const INPUT_TO_PROCESSES: &str = "inputToProcesses";
    pub const OUTPUT_FROM_PROCESSES: &str = "outputFromProcesses";
}

/// A catalog entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub relationship_attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_attributes: Option<UniqueAttributes>,
    /// Tags on the asset. `None` leaves tags untouched on save; `Some(vec![])`
    /// clears them when saved with tag replacement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifications: Option<Vec<AtlanTag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<i64>,
}

/// Generates a client-side placeholder GUID: `-` followed by a random
/// non-negative 63-bit integer. The server swaps it for a real GUID on save.
pub fn temporary_guid() -> String {
    let (high, _) = Uuid::new_v4().as_u64_pair();
    format!("-{}", high >> 1)
}

impl Asset {
    /// An empty asset of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            guid: None,
            status: None,
            attributes: Map::new(),
            relationship_attributes: Map::new(),
            unique_attributes: None,
            classifications: None,
            created_by: None,
            updated_by: None,
            create_time: None,
            update_time: None,
        }
    }

    /// An asset carrying a temporary GUID, ready to be sent in a save.
    pub fn with_temporary_guid(type_name: impl Into<String>) -> Self {
        let mut asset = Self::new(type_name);
        asset.guid = Some(temporary_guid());
        asset
    }

    /// The minimal update payload: temporary GUID, qualified name and name.
    pub fn updater(type_name: &str, qualified_name: &str, name: &str) -> AtlanResult<Self> {
        let mut missing = Vec::new();
        if qualified_name.is_empty() {
            missing.push(attr::QUALIFIED_NAME);
        }
        if name.is_empty() {
            missing.push(attr::NAME);
        }
        if !missing.is_empty() {
            return Err(AtlanError::missing_parameters(type_name, &missing));
        }

        let mut asset = Self::with_temporary_guid(type_name);
        asset.set_attribute(attr::QUALIFIED_NAME, qualified_name);
        asset.set_attribute(attr::NAME, name);
        Ok(asset)
    }

    /// True when the GUID was generated client-side and not yet persisted.
    pub fn has_temporary_guid(&self) -> bool {
        self.guid.as_deref().is_some_and(|g| g.starts_with('-'))
    }

    pub fn is_archived(&self) -> bool {
        self.status == Some(EntityStatus::Deleted)
    }

    // ----- generic attribute access -----

    /// An attribute value, checking `attributes` then `relationshipAttributes`.
    /// Explicit nulls count as absent.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes
            .get(key)
            .filter(|v| !v.is_null())
            .or_else(|| self.relationship_attributes.get(key).filter(|v| !v.is_null()))
    }

    pub fn str_attribute(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(Value::as_str)
    }

    pub fn i64_attribute(&self, key: &str) -> Option<i64> {
        self.attribute(key).and_then(Value::as_i64)
    }

    pub fn bool_attribute(&self, key: &str) -> Option<bool> {
        self.attribute(key).and_then(Value::as_bool)
    }

    /// A multi-valued string attribute; absent attributes yield an empty list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.attribute(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A single-valued relationship.
    pub fn reference(&self, key: &str) -> Option<AssetRef> {
        self.attribute(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// A multi-valued relationship. Entries that are not references are skipped.
    pub fn references(&self, key: &str) -> Vec<AssetRef> {
        self.attribute(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn set_reference(&mut self, key: &str, reference: AssetRef) {
        // AssetRef serialization cannot fail: all fields are strings or options.
        let value = serde_json::to_value(reference).unwrap_or(Value::Null);
        self.attributes.insert(key.to_string(), value);
    }

    pub fn set_references(&mut self, key: &str, references: Vec<AssetRef>) {
        let value = serde_json::to_value(references).unwrap_or(Value::Array(Vec::new()));
        self.attributes.insert(key.to_string(), value);
    }

    /// Marks an attribute to be cleared on the next save.
    pub fn clear_attribute(&mut self, key: &str) {
        self.attributes.insert(key.to_string(), Value::Null);
    }

    /// Attribute names explicitly set to null.
    pub fn null_fields(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, v)| v.is_null())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    // ----- common attributes -----

    /// The qualified name, falling back to `uniqueAttributes`.
    pub fn qualified_name(&self) -> Option<&str> {
        self.str_attribute(attr::QUALIFIED_NAME)
            .filter(|q| !q.is_empty())
            .or_else(|| {
                self.unique_attributes
                    .as_ref()
                    .and_then(|u| u.qualified_name.as_deref())
                    .filter(|q| !q.is_empty())
            })
    }

    pub fn name(&self) -> Option<&str> {
        self.str_attribute(attr::NAME)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.str_attribute(attr::DISPLAY_NAME)
    }

    pub fn description(&self) -> Option<&str> {
        self.str_attribute(attr::DESCRIPTION)
    }

    pub fn user_description(&self) -> Option<&str> {
        self.str_attribute(attr::USER_DESCRIPTION)
    }

    pub fn owner_users(&self) -> Vec<String> {
        self.string_list(attr::OWNER_USERS)
    }

    pub fn owner_groups(&self) -> Vec<String> {
        self.string_list(attr::OWNER_GROUPS)
    }

    pub fn certificate_status(&self) -> Option<CertificateStatus> {
        self.attribute(attr::CERTIFICATE_STATUS)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn certificate_status_message(&self) -> Option<&str> {
        self.str_attribute(attr::CERTIFICATE_STATUS_MESSAGE)
    }

    pub fn announcement_type(&self) -> Option<AnnouncementType> {
        self.attribute(attr::ANNOUNCEMENT_TYPE)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn announcement_title(&self) -> Option<&str> {
        self.str_attribute(attr::ANNOUNCEMENT_TITLE)
    }

    pub fn announcement_message(&self) -> Option<&str> {
        self.str_attribute(attr::ANNOUNCEMENT_MESSAGE)
    }

    pub fn connector_name(&self) -> Option<&str> {
        self.str_attribute(attr::CONNECTOR_NAME)
    }

    pub fn connection_qualified_name(&self) -> Option<&str> {
        self.str_attribute(attr::CONNECTION_QUALIFIED_NAME)
    }

    /// Glossary terms assigned to the asset.
    pub fn assigned_terms(&self) -> Vec<AssetRef> {
        self.references(attr::MEANINGS)
    }

    /// Tags on the asset, direct and propagated.
    pub fn atlan_tags(&self) -> &[AtlanTag] {
        self.classifications.as_deref().unwrap_or(&[])
    }

    pub fn atlan_tag_names(&self) -> Vec<&str> {
        self.atlan_tags()
            .iter()
            .map(|t| t.type_name.as_str())
            .collect()
    }

    /// Processes that read from this asset.
    pub fn input_to_processes(&self) -> Vec<AssetRef> {
        self.references(attr::INPUT_TO_PROCESSES)
    }

    /// Processes that produced this asset.
    pub fn output_from_processes(&self) -> Vec<AssetRef> {
        self.references(attr::OUTPUT_FROM_PROCESSES)
    }

    // ----- references -----

    /// Reduces the asset to a reference: GUID first, then qualified name,
    /// then `uniqueAttributes.qualifiedName`.
    pub fn trim_to_reference(&self) -> AtlanResult<AssetRef> {
        if let Some(guid) = self.guid.as_deref().filter(|g| !g.is_empty()) {
            return Ok(AssetRef::by_guid(&self.type_name, guid));
        }
        if let Some(qn) = self.qualified_name() {
            return Ok(AssetRef::by_qualified_name(&self.type_name, qn));
        }
        Err(AtlanError::missing_reference_identity(&self.type_name))
    }
}
