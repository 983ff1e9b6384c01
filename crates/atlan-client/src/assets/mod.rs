//! Typed assets.
//!
//! Each asset type is a newtype over [`Asset`] declared with `asset_type!`,
//! which supplies the conversions and the static helpers (`get`, `updater`,
//! `select`, tag and term helpers, ...) shared by every type. Type files add
//! the `creator` and the type's own attributes.

use crate::model::{
    attr, qualified_name, AnnouncementType, Asset, AssetRef, AtlanTag, CertificateStatus,
};
use crate::traits::{AtlanError, AtlanResult};
use serde_json::Value;

pub mod ops;

/// Behaviour shared by every typed asset.
pub trait AssetKind: Sized + Send {
    /// The server-side type name, e.g. `"Table"`.
    const TYPE_NAME: &'static str;
    /// Ancestor type names, nearest first.
    const SUPER_TYPES: &'static [&'static str];

    /// Wraps an asset without checking its type.
    fn from_asset_unchecked(asset: Asset) -> Self;
    fn as_asset(&self) -> &Asset;
    fn as_asset_mut(&mut self) -> &mut Asset;
    fn into_asset(self) -> Asset;

    /// Wraps an asset, failing with `NotFound` when it is of another type.
    fn try_from_asset(asset: Asset) -> AtlanResult<Self> {
        if asset.type_name == Self::TYPE_NAME {
            Ok(Self::from_asset_unchecked(asset))
        } else {
            let id = asset
                .guid
                .clone()
                .or_else(|| asset.qualified_name().map(str::to_string))
                .unwrap_or_default();
            Err(AtlanError::asset_not_type_requested(
                &id,
                Self::TYPE_NAME,
                &asset.type_name,
            ))
        }
    }

    fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.as_asset_mut().set_attribute(key, value);
        self
    }

    fn with_display_name(self, display_name: &str) -> Self {
        self.with_attribute(attr::DISPLAY_NAME, display_name)
    }

    fn with_description(self, description: &str) -> Self {
        self.with_attribute(attr::DESCRIPTION, description)
    }

    fn with_user_description(self, description: &str) -> Self {
        self.with_attribute(attr::USER_DESCRIPTION, description)
    }

    fn with_owner_users<I, S>(self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let users: Vec<String> = users.into_iter().map(Into::into).collect();
        self.with_attribute(attr::OWNER_USERS, users)
    }

    fn with_owner_groups<I, S>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups: Vec<String> = groups.into_iter().map(Into::into).collect();
        self.with_attribute(attr::OWNER_GROUPS, groups)
    }

    fn with_certificate(mut self, status: CertificateStatus, message: Option<&str>) -> Self {
        let asset = self.as_asset_mut();
        asset.set_attribute(attr::CERTIFICATE_STATUS, status.as_str());
        if let Some(message) = message {
            asset.set_attribute(attr::CERTIFICATE_STATUS_MESSAGE, message);
        }
        self
    }

    fn with_announcement(
        mut self,
        announcement_type: AnnouncementType,
        title: &str,
        message: Option<&str>,
    ) -> Self {
        let asset = self.as_asset_mut();
        asset.set_attribute(attr::ANNOUNCEMENT_TYPE, announcement_type.as_str());
        asset.set_attribute(attr::ANNOUNCEMENT_TITLE, title);
        if let Some(message) = message {
            asset.set_attribute(attr::ANNOUNCEMENT_MESSAGE, message);
        }
        self
    }

    fn with_assigned_terms(mut self, terms: Vec<AssetRef>) -> Self {
        self.as_asset_mut().set_references(attr::MEANINGS, terms);
        self
    }

    fn with_atlan_tags(mut self, tags: Vec<AtlanTag>) -> Self {
        self.as_asset_mut().classifications = Some(tags);
        self
    }
}

/// Declares a typed asset and its shared helpers.
macro_rules! asset_type {
    ($(#[$meta:meta])* $name:ident, $type_name:literal, [$($super_type:literal),* $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name($crate::model::Asset);

        impl $crate::assets::AssetKind for $name {
            const TYPE_NAME: &'static str = $type_name;
            const SUPER_TYPES: &'static [&'static str] = &[$($super_type),*];

            fn from_asset_unchecked(asset: $crate::model::Asset) -> Self {
                Self(asset)
            }

            fn as_asset(&self) -> &$crate::model::Asset {
                &self.0
            }

            fn as_asset_mut(&mut self) -> &mut $crate::model::Asset {
                &mut self.0
            }

            fn into_asset(self) -> $crate::model::Asset {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::model::Asset;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<$name> for $crate::model::Asset {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<$crate::model::Asset> for $name {
            type Error = $crate::traits::AtlanError;

            fn try_from(asset: $crate::model::Asset) -> Result<Self, Self::Error> {
                <Self as $crate::assets::AssetKind>::try_from_asset(asset)
            }
        }

        impl $name {
            pub const TYPE_NAME: &'static str = $type_name;

            /// The minimal asset needed to update an existing one.
            pub fn updater(qualified_name: &str, name: &str) -> $crate::traits::AtlanResult<Self> {
                $crate::model::Asset::updater($type_name, qualified_name, name).map(Self)
            }

            pub fn ref_by_guid(guid: &str) -> $crate::model::AssetRef {
                $crate::model::AssetRef::by_guid($type_name, guid)
            }

            pub fn ref_by_qualified_name(qualified_name: &str) -> $crate::model::AssetRef {
                $crate::model::AssetRef::by_qualified_name($type_name, qualified_name)
            }

            pub fn trim_to_reference(&self) -> $crate::traits::AtlanResult<$crate::model::AssetRef> {
                self.0.trim_to_reference()
            }

            /// A search over assets of this type.
            pub fn select(include_archived: bool) -> $crate::search::FluentSearch {
                $crate::assets::ops::select($type_name, include_archived)
            }

            /// Fetches by GUID or qualified name, whichever `id` is.
            pub async fn get(
                client: &dyn $crate::traits::CatalogConnector,
                id: &str,
                load_relationships: bool,
            ) -> $crate::traits::AtlanResult<Self> {
                $crate::assets::ops::get(client, $type_name, id, load_relationships)
                    .await
                    .map(Self)
            }

            pub async fn get_by_guid(
                client: &dyn $crate::traits::CatalogConnector,
                guid: &str,
                load_relationships: bool,
            ) -> $crate::traits::AtlanResult<Self> {
                $crate::assets::ops::get_by_guid(client, $type_name, guid, load_relationships)
                    .await
                    .map(Self)
            }

            pub async fn get_by_qualified_name(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                load_relationships: bool,
            ) -> $crate::traits::AtlanResult<Self> {
                $crate::assets::ops::get_by_qualified_name(
                    client,
                    $type_name,
                    qualified_name,
                    load_relationships,
                )
                .await
                .map(Self)
            }

            pub async fn restore(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
            ) -> $crate::traits::AtlanResult<bool> {
                $crate::assets::ops::restore(client, $type_name, qualified_name).await
            }

            pub async fn archive(
                client: &dyn $crate::traits::CatalogConnector,
                guid: &str,
            ) -> $crate::traits::AtlanResult<$crate::model::MutationResponse> {
                $crate::assets::ops::archive(client, guid).await
            }

            pub async fn purge(
                client: &dyn $crate::traits::CatalogConnector,
                guid: &str,
            ) -> $crate::traits::AtlanResult<$crate::model::MutationResponse> {
                $crate::assets::ops::purge(client, guid).await
            }

            pub async fn remove_description(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                name: &str,
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::remove_description(client, $type_name, qualified_name, name)
                    .await
                    .map(|a| a.map(Self))
            }

            pub async fn remove_user_description(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                name: &str,
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::remove_user_description(
                    client,
                    $type_name,
                    qualified_name,
                    name,
                )
                .await
                .map(|a| a.map(Self))
            }

            pub async fn remove_owners(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                name: &str,
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::remove_owners(client, $type_name, qualified_name, name)
                    .await
                    .map(|a| a.map(Self))
            }

            pub async fn update_certificate(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                name: &str,
                status: $crate::model::CertificateStatus,
                message: Option<&str>,
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::update_certificate(
                    client,
                    $type_name,
                    qualified_name,
                    name,
                    status,
                    message,
                )
                .await
                .map(|a| a.map(Self))
            }

            pub async fn remove_certificate(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                name: &str,
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::remove_certificate(client, $type_name, qualified_name, name)
                    .await
                    .map(|a| a.map(Self))
            }

            pub async fn update_announcement(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                name: &str,
                announcement_type: $crate::model::AnnouncementType,
                title: &str,
                message: Option<&str>,
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::update_announcement(
                    client,
                    $type_name,
                    qualified_name,
                    name,
                    announcement_type,
                    title,
                    message,
                )
                .await
                .map(|a| a.map(Self))
            }

            pub async fn remove_announcement(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                name: &str,
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::remove_announcement(client, $type_name, qualified_name, name)
                    .await
                    .map(|a| a.map(Self))
            }

            pub async fn replace_terms(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                name: &str,
                terms: &[$crate::model::AssetRef],
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::replace_terms(client, $type_name, qualified_name, name, terms)
                    .await
                    .map(|a| a.map(Self))
            }

            pub async fn append_terms(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                terms: &[$crate::model::AssetRef],
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::append_terms(client, $type_name, qualified_name, terms)
                    .await
                    .map(|a| a.map(Self))
            }

            pub async fn remove_terms(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                terms: &[$crate::model::AssetRef],
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::remove_terms(client, $type_name, qualified_name, terms)
                    .await
                    .map(|a| a.map(Self))
            }

            pub async fn append_atlan_tags(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                names: &[&str],
                propagate: bool,
                remove_propagations_on_delete: bool,
                restrict_lineage_propagation: bool,
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::append_atlan_tags(
                    client,
                    $type_name,
                    qualified_name,
                    names,
                    propagate,
                    remove_propagations_on_delete,
                    restrict_lineage_propagation,
                )
                .await
                .map(|a| a.map(Self))
            }

            pub async fn remove_atlan_tag(
                client: &dyn $crate::traits::CatalogConnector,
                qualified_name: &str,
                tag_name: &str,
            ) -> $crate::traits::AtlanResult<Option<Self>> {
                $crate::assets::ops::remove_atlan_tag(client, $type_name, qualified_name, tag_name)
                    .await
                    .map(|a| a.map(Self))
            }
        }
    };
}

mod adls;
mod anaplan;
mod cognite;
mod connection;
mod glossary;
mod lineage;
mod sql;

pub use adls::{ADLSAccount, ADLSContainer, ADLSObject};
pub use anaplan::{AnaplanList, AnaplanModel, AnaplanWorkspace};
pub use cognite::{CogniteAsset, CogniteFile};
pub use connection::Connection;
pub use glossary::{Glossary, GlossaryTerm};
pub use lineage::Process;
pub use sql::{Column, Database, Schema, Table, View};

/// Every typed asset with its super types, nearest first.
pub const KNOWN_TYPES: &[(&str, &[&str])] = &[
    (Connection::TYPE_NAME, <Connection as AssetKind>::SUPER_TYPES),
    (Database::TYPE_NAME, <Database as AssetKind>::SUPER_TYPES),
    (Schema::TYPE_NAME, <Schema as AssetKind>::SUPER_TYPES),
    (Table::TYPE_NAME, <Table as AssetKind>::SUPER_TYPES),
    (View::TYPE_NAME, <View as AssetKind>::SUPER_TYPES),
    (Column::TYPE_NAME, <Column as AssetKind>::SUPER_TYPES),
    (ADLSAccount::TYPE_NAME, <ADLSAccount as AssetKind>::SUPER_TYPES),
    (ADLSContainer::TYPE_NAME, <ADLSContainer as AssetKind>::SUPER_TYPES),
    (ADLSObject::TYPE_NAME, <ADLSObject as AssetKind>::SUPER_TYPES),
    (AnaplanWorkspace::TYPE_NAME, <AnaplanWorkspace as AssetKind>::SUPER_TYPES),
    (AnaplanModel::TYPE_NAME, <AnaplanModel as AssetKind>::SUPER_TYPES),
    (AnaplanList::TYPE_NAME, <AnaplanList as AssetKind>::SUPER_TYPES),
    (CogniteAsset::TYPE_NAME, <CogniteAsset as AssetKind>::SUPER_TYPES),
    (CogniteFile::TYPE_NAME, <CogniteFile as AssetKind>::SUPER_TYPES),
    (Process::TYPE_NAME, <Process as AssetKind>::SUPER_TYPES),
    (Glossary::TYPE_NAME, <Glossary as AssetKind>::SUPER_TYPES),
    (GlossaryTerm::TYPE_NAME, <GlossaryTerm as AssetKind>::SUPER_TYPES),
];

/// Super types of a known type name; empty for unknown types.
pub fn super_types_of(type_name: &str) -> &'static [&'static str] {
    KNOWN_TYPES
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, supers)| *supers)
        .unwrap_or(&[])
}

/// The parent an asset is created under.
pub(crate) struct Parent<'a> {
    /// Type of the parent asset.
    pub type_name: &'static str,
    /// Relationship attribute pointing at the parent, if the type has one.
    pub relationship: Option<&'static str>,
    /// Attributes holding the parent's name and qualified name.
    pub name_attr: Option<&'static str>,
    pub qualified_name_attr: &'static str,
    /// Segments in the parent's qualified name.
    pub depth: usize,
    pub qualified_name: &'a str,
}

/// Builds a new asset beneath `parent`: validates the parameters and the
/// parent's depth, then fills in the qualified name, connection, connector
/// and parent attributes.
pub(crate) fn child_of(type_name: &str, name: &str, parent: Parent<'_>) -> AtlanResult<Asset> {
    qualified_name::validate_required(
        type_name,
        &[
            (attr::NAME, name),
            (parent.qualified_name_attr, parent.qualified_name),
        ],
    )?;
    qualified_name::require_depth(parent.qualified_name, parent.depth, parent.type_name)?;

    let connector = qualified_name::connector_of(parent.qualified_name).ok_or_else(|| {
        AtlanError::InvalidRequest(format!(
            "Unable to determine the connector of {}",
            parent.qualified_name
        ))
    })?;
    let connection = qualified_name::connection_of(parent.qualified_name).unwrap_or_default();

    let mut asset = Asset::with_temporary_guid(type_name);
    asset.set_attribute(attr::NAME, name);
    asset.set_attribute(
        attr::QUALIFIED_NAME,
        qualified_name::child(parent.qualified_name, name),
    );
    asset.set_attribute(attr::CONNECTOR_NAME, connector.value());
    asset.set_attribute(attr::CONNECTION_QUALIFIED_NAME, connection);
    asset.set_attribute(parent.qualified_name_attr, parent.qualified_name);
    if let Some(name_attr) = parent.name_attr {
        asset.set_attribute(name_attr, last_segment(parent.qualified_name));
    }
    if let Some(relationship) = parent.relationship {
        asset.set_reference(
            relationship,
            AssetRef::by_qualified_name(parent.type_name, parent.qualified_name),
        );
    }
    Ok(asset)
}

/// Records an ancestor's name and qualified name on `asset`.
pub(crate) fn set_ancestor(
    asset: &mut Asset,
    name_attr: &str,
    qualified_name_attr: &str,
    ancestor_qualified_name: &str,
) {
    asset.set_attribute(name_attr, last_segment(ancestor_qualified_name));
    asset.set_attribute(qualified_name_attr, ancestor_qualified_name);
}

pub(crate) fn last_segment(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('/')
        .map(|(_, last)| last)
        .unwrap_or(qualified_name)
}
