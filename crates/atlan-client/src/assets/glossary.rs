//! Business glossaries and their terms.

use super::AssetKind;
use crate::model::{attr, qualified_name, Asset, AssetRef};
use crate::traits::AtlanResult;
use uuid::Uuid;

const ANCHOR: &str = "anchor";
const SHORT_DESCRIPTION: &str = "shortDescription";
const LONG_DESCRIPTION: &str = "longDescription";

asset_type!(
    /// A business glossary.
    Glossary,
    "AtlasGlossary",
    ["Asset", "Referenceable"]
);

asset_type!(
    /// A term defined in a glossary, assignable to other assets.
    GlossaryTerm,
    "AtlasGlossaryTerm",
    ["Asset", "Referenceable"]
);

/// Glossary objects have no natural hierarchy, so their qualified names are
/// generated identifiers.
fn generated_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl Glossary {
    pub fn creator(name: &str) -> AtlanResult<Self> {
        qualified_name::validate_required(Self::TYPE_NAME, &[(attr::NAME, name)])?;
        let mut asset = Asset::with_temporary_guid(Self::TYPE_NAME);
        asset.set_attribute(attr::NAME, name);
        asset.set_attribute(attr::QUALIFIED_NAME, generated_id());
        Ok(Self(asset))
    }

    pub fn with_short_description(self, text: &str) -> Self {
        self.with_attribute(SHORT_DESCRIPTION, text)
    }

    pub fn short_description(&self) -> Option<&str> {
        self.str_attribute(SHORT_DESCRIPTION)
    }

    pub fn terms(&self) -> Vec<AssetRef> {
        self.references("terms")
    }
}

impl GlossaryTerm {
    /// A term in the glossary at `glossary_qualified_name`, qualified as
    /// `<generated id>@<glossary qualified name>`.
    pub fn creator(name: &str, glossary_qualified_name: &str) -> AtlanResult<Self> {
        qualified_name::validate_required(
            Self::TYPE_NAME,
            &[(attr::NAME, name), ("glossaryQualifiedName", glossary_qualified_name)],
        )?;
        let mut asset = Asset::with_temporary_guid(Self::TYPE_NAME);
        asset.set_attribute(attr::NAME, name);
        asset.set_attribute(
            attr::QUALIFIED_NAME,
            format!("{}@{}", generated_id(), glossary_qualified_name),
        );
        asset.set_reference(
            ANCHOR,
            AssetRef::by_qualified_name(Glossary::TYPE_NAME, glossary_qualified_name),
        );
        Ok(Self(asset))
    }

    pub fn with_short_description(self, text: &str) -> Self {
        self.with_attribute(SHORT_DESCRIPTION, text)
    }

    pub fn with_long_description(self, text: &str) -> Self {
        self.with_attribute(LONG_DESCRIPTION, text)
    }

    /// The glossary the term belongs to.
    pub fn anchor(&self) -> Option<AssetRef> {
        self.reference(ANCHOR)
    }

    /// Qualified name of the owning glossary, taken from the term's own
    /// qualified name.
    pub fn glossary_qualified_name(&self) -> Option<&str> {
        self.qualified_name()
            .and_then(|qn| qn.split_once('@'))
            .map(|(_, glossary)| glossary)
    }

    pub fn short_description(&self) -> Option<&str> {
        self.str_attribute(SHORT_DESCRIPTION)
    }

    pub fn long_description(&self) -> Option<&str> {
        self.str_attribute(LONG_DESCRIPTION)
    }

    /// Assets this term is assigned to.
    pub fn assigned_entities(&self) -> Vec<AssetRef> {
        self.references("assignedEntities")
    }
}
