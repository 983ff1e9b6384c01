//! Wire models shared by every asset type and connector.

pub mod asset;
pub mod enums;
pub mod mutation;
pub mod qualified_name;
pub mod reference;
pub mod tag;
pub mod typedef;

pub use asset::{attr, temporary_guid, Asset};
pub use enums::{
    ADLSAccessTier, AnnouncementType, AtlanConnectorType, CertificateStatus, ConnectorCategory,
    DeleteType, EntityStatus,
};
pub use mutation::{MutatedEntities, MutationResponse};
pub use reference::{AssetRef, UniqueAttributes};
pub use tag::AtlanTag;
pub use typedef::{
    AtlanTagColor, AtlanTagDef, AttributeDef, Cardinality, CustomMetadataDef, EntityDef, EnumDef,
    EnumElementDef, StructDef, TypeDefCategory, TypeDefResponse,
};
