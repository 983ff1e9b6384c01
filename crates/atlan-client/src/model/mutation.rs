//! Result of a save, delete or restore.

use super::asset::Asset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutatedEntities {
    #[serde(rename = "CREATE", default, skip_serializing_if = "Vec::is_empty")]
    pub create: Vec<Asset>,
    #[serde(rename = "UPDATE", default, skip_serializing_if = "Vec::is_empty")]
    pub update: Vec<Asset>,
    #[serde(rename = "PARTIAL_UPDATE", default, skip_serializing_if = "Vec::is_empty")]
    pub partial_update: Vec<Asset>,
    #[serde(rename = "DELETE", default, skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<Asset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    #[serde(default)]
    pub mutated_entities: MutatedEntities,
    /// Temporary GUID sent by the client to the GUID the server assigned.
    #[serde(default)]
    pub guid_assignments: HashMap<String, String>,
}

impl MutationResponse {
    pub fn created_assets(&self) -> &[Asset] {
        &self.mutated_entities.create
    }

    /// Fully and partially updated assets.
    pub fn updated_assets(&self) -> Vec<&Asset> {
        self.mutated_entities
            .update
            .iter()
            .chain(self.mutated_entities.partial_update.iter())
            .collect()
    }

    pub fn deleted_assets(&self) -> &[Asset] {
        &self.mutated_entities.delete
    }

    pub fn assigned_guid(&self, temporary_guid: &str) -> Option<&str> {
        self.guid_assignments.get(temporary_guid).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        let m = &self.mutated_entities;
        m.create.is_empty() && m.update.is_empty() && m.partial_update.is_empty() && m.delete.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mutation_response() {
        let response: MutationResponse = serde_json::from_value(serde_json::json!({
            "mutatedEntities": {
                "CREATE": [{ "typeName": "Table", "guid": "g1", "attributes": { "qualifiedName": "a" } }],
                "PARTIAL_UPDATE": [{ "typeName": "Schema", "guid": "g2", "attributes": {} }]
            },
            "guidAssignments": { "-12345": "g1" }
        }))
        .unwrap();

        assert_eq!(response.created_assets().len(), 1);
        assert_eq!(response.updated_assets()[0].guid.as_deref(), Some("g2"));
        assert!(response.deleted_assets().is_empty());
        assert_eq!(response.assigned_guid("-12345"), Some("g1"));
        assert!(!response.is_empty());
    }

    #[test]
    fn test_empty_response() {
        let response: MutationResponse = serde_json::from_str("{}").unwrap();
        assert!(response.is_empty());
    }
}
