//! Type-registry definitions.
//!
//! Tag definitions and custom metadata have an internal (hashed) `name` and
//! a human-readable `displayName`; the server generates the former on create.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Category of type definitions to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDefCategory {
    AtlanTag,
    Enum,
    Struct,
    CustomMetadata,
    Entity,
    Relationship,
}

impl TypeDefCategory {
    /// Value of the `type` query parameter.
    pub fn query_value(&self) -> &'static str {
        match self {
            TypeDefCategory::AtlanTag => "classification",
            TypeDefCategory::Enum => "enum",
            TypeDefCategory::Struct => "struct",
            TypeDefCategory::CustomMetadata => "business_metadata",
            TypeDefCategory::Entity => "entity",
            TypeDefCategory::Relationship => "relationship",
        }
    }
}

impl fmt::Display for TypeDefCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value())
    }
}

/// Colour of a tag's badge in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtlanTagColor {
    Green,
    Yellow,
    Red,
    Gray,
}

impl AtlanTagColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            AtlanTagColor::Green => "Green",
            AtlanTagColor::Yellow => "Yellow",
            AtlanTagColor::Red => "Red",
            AtlanTagColor::Gray => "Gray",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlanTagDef {
    /// Internal name; empty until the server assigns one.
    #[serde(default)]
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl AtlanTagDef {
    pub fn creator(display_name: impl Into<String>, color: AtlanTagColor) -> Self {
        let mut options = HashMap::new();
        options.insert("color".to_string(), color.as_str().to_string());
        Self {
            name: String::new(),
            display_name: display_name.into(),
            description: None,
            guid: None,
            options,
        }
    }

    pub fn color(&self) -> Option<&str> {
        self.options.get("color").map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumElementDef {
    pub value: String,
    pub ordinal: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub element_defs: Vec<EnumElementDef>,
}

impl EnumDef {
    /// Ordinals follow the order of `values`.
    pub fn creator(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: None,
            element_defs: values
                .iter()
                .enumerate()
                .map(|(i, v)| EnumElementDef {
                    value: v.to_string(),
                    ordinal: i as u32,
                })
                .collect(),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        self.element_defs.iter().map(|e| e.value.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    Single,
    Set,
    List,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDef {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub type_name: String,
    #[serde(default = "default_optional")]
    pub is_optional: bool,
    #[serde(default = "default_cardinality")]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

fn default_optional() -> bool {
    true
}

fn default_cardinality() -> Cardinality {
    Cardinality::Single
}

impl AttributeDef {
    /// A custom-metadata attribute; `multi_valued` selects `SET` cardinality.
    pub fn creator(display_name: impl Into<String>, type_name: impl Into<String>, multi_valued: bool) -> Self {
        Self {
            name: String::new(),
            display_name: Some(display_name.into()),
            type_name: type_name.into(),
            is_optional: true,
            cardinality: if multi_valued {
                Cardinality::Set
            } else {
                Cardinality::Single
            },
            options: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMetadataDef {
    #[serde(default)]
    pub name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub attribute_defs: Vec<AttributeDef>,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl CustomMetadataDef {
    pub fn creator(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attribute_defs.push(attribute);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructDef {
    pub name: String,
    #[serde(default)]
    pub attribute_defs: Vec<AttributeDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub super_types: Vec<String>,
    #[serde(default)]
    pub attribute_defs: Vec<AttributeDef>,
}

/// Type definitions grouped by category, used for both reads and creates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefResponse {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_defs: Vec<EnumDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub struct_defs: Vec<StructDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classification_defs: Vec<AtlanTagDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub business_metadata_defs: Vec<CustomMetadataDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_defs: Vec<EntityDef>,
}

impl TypeDefResponse {
    pub fn with_atlan_tag(mut self, def: AtlanTagDef) -> Self {
        self.classification_defs.push(def);
        self
    }

    pub fn with_enum(mut self, def: EnumDef) -> Self {
        self.enum_defs.push(def);
        self
    }

    pub fn with_custom_metadata(mut self, def: CustomMetadataDef) -> Self {
        self.business_metadata_defs.push(def);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.enum_defs.is_empty()
            && self.struct_defs.is_empty()
            && self.classification_defs.is_empty()
            && self.business_metadata_defs.is_empty()
            && self.entity_defs.is_empty()
    }

    /// Keeps only the definitions of one category.
    pub fn only(&self, category: TypeDefCategory) -> Self {
        let mut out = Self::default();
        match category {
            TypeDefCategory::AtlanTag => out.classification_defs = self.classification_defs.clone(),
            TypeDefCategory::Enum => out.enum_defs = self.enum_defs.clone(),
            TypeDefCategory::Struct => out.struct_defs = self.struct_defs.clone(),
            TypeDefCategory::CustomMetadata => {
                out.business_metadata_defs = self.business_metadata_defs.clone()
            }
            TypeDefCategory::Entity => out.entity_defs = self.entity_defs.clone(),
            TypeDefCategory::Relationship => {}
        }
        out
    }
}
