//! Atlan tag (classification) assignments.

use super::enums::EntityStatus;
use serde::{Deserialize, Serialize};

/// A tag attached to an asset.
///
/// `type_name` holds the human-readable tag name in SDK code. Connectors that
/// talk to the server translate it to and from the internal identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlanTag {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_status: Option<EntityStatus>,
    /// Propagate the tag to downstream lineage and child assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_propagations_on_entity_delete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrict_propagation_through_lineage: Option<bool>,
}

impl AtlanTag {
    /// A tag with propagation settings left to the server defaults.
    pub fn of(name: impl Into<String>) -> Self {
        Self {
            type_name: name.into(),
            entity_guid: None,
            entity_status: None,
            propagate: None,
            remove_propagations_on_entity_delete: None,
            restrict_propagation_through_lineage: None,
        }
    }

    pub fn with_propagation(
        mut self,
        propagate: bool,
        remove_propagations_on_delete: bool,
        restrict_lineage_propagation: bool,
    ) -> Self {
        self.propagate = Some(propagate);
        self.remove_propagations_on_entity_delete = Some(remove_propagations_on_delete);
        self.restrict_propagation_through_lineage = Some(restrict_lineage_propagation);
        self
    }

    /// Whether the tag was attached to this asset directly rather than
    /// propagated from another asset.
    pub fn is_direct_on(&self, asset_guid: Option<&str>) -> bool {
        match (&self.entity_guid, asset_guid) {
            (Some(source), Some(guid)) => source == guid,
            _ => true,
        }
    }
}
