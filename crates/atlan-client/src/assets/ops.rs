//! Type-agnostic asset operations.
//!
//! Each typed asset's helpers delegate here with their type name. The
//! read-then-write helpers fetch the current asset, compute the new value and
//! submit only the minimal updater; they return `None` when nothing changed.

use crate::model::{
    attr, Asset, AssetRef, AtlanTag, AnnouncementType, CertificateStatus, DeleteType,
    EntityStatus, MutationResponse,
};
use crate::search::{fields, FluentSearch};
use crate::traits::{AtlanError, AtlanResult, CatalogConnector, SaveOptions};
use atlan_observability::asset_span;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, Instrument};

static GUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("Invalid GUID pattern")
});

/// Whether `id` is shaped like a persisted GUID.
pub fn is_guid(id: &str) -> bool {
    GUID_PATTERN.is_match(id)
}

/// A search over assets of one type, active ones only unless
/// `include_archived`.
pub fn select(type_name: &str, include_archived: bool) -> FluentSearch {
    let search = FluentSearch::new().filter(fields::TYPE_NAME.eq(type_name));
    if include_archived {
        search
    } else {
        search.active()
    }
}

fn ensure_type(asset: Asset, type_name: &str, id: &str) -> AtlanResult<Asset> {
    if asset.type_name == type_name {
        Ok(asset)
    } else {
        Err(AtlanError::asset_not_type_requested(
            id,
            type_name,
            &asset.type_name,
        ))
    }
}

/// Fetches by GUID when `id` looks like one, otherwise by qualified name.
pub async fn get(
    client: &dyn CatalogConnector,
    type_name: &str,
    id: &str,
    load_relationships: bool,
) -> AtlanResult<Asset> {
    if is_guid(id) {
        get_by_guid(client, type_name, id, load_relationships).await
    } else {
        get_by_qualified_name(client, type_name, id, load_relationships).await
    }
}

pub async fn get_by_guid(
    client: &dyn CatalogConnector,
    type_name: &str,
    guid: &str,
    load_relationships: bool,
) -> AtlanResult<Asset> {
    let asset = client
        .get_by_guid(guid, !load_relationships, !load_relationships)
        .await?;
    ensure_type(asset, type_name, guid)
}

pub async fn get_by_qualified_name(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    load_relationships: bool,
) -> AtlanResult<Asset> {
    let asset = client
        .get_by_qualified_name(
            type_name,
            qualified_name,
            !load_relationships,
            !load_relationships,
        )
        .await?;
    ensure_type(asset, type_name, qualified_name)
}

/// Restores an archived asset. Returns `false` when no such asset exists;
/// an asset that is already active counts as restored.
pub async fn restore(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
) -> AtlanResult<bool> {
    let existing = match get_by_qualified_name(client, type_name, qualified_name, false).await {
        Ok(asset) => asset,
        Err(e) if e.is_not_found() => return Ok(false),
        Err(e) => return Err(e),
    };
    if existing.status != Some(EntityStatus::Deleted) {
        return Ok(true);
    }
    let guid = existing
        .guid
        .ok_or_else(|| AtlanError::InvalidResponse(format!("{} has no GUID", qualified_name)))?;

    client
        .restore(&[guid])
        .instrument(asset_span!(type_name, qualified_name))
        .await?;
    info!(type_name, qualified_name, "Restored asset");
    Ok(true)
}

pub async fn archive(client: &dyn CatalogConnector, guid: &str) -> AtlanResult<MutationResponse> {
    client.delete(&[guid.to_string()], DeleteType::Soft).await
}

pub async fn purge(client: &dyn CatalogConnector, guid: &str) -> AtlanResult<MutationResponse> {
    client.delete(&[guid.to_string()], DeleteType::Hard).await
}

/// The asset in `response` that the save of (`type_name`, `qualified_name`)
/// updated. Creates are not reported.
pub fn updated_asset(
    response: &MutationResponse,
    type_name: &str,
    qualified_name: &str,
) -> Option<Asset> {
    response
        .updated_assets()
        .into_iter()
        .find(|a| a.type_name == type_name && a.qualified_name() == Some(qualified_name))
        .cloned()
}

/// Saves a single asset and returns its post-save state, if it changed.
pub async fn save_one(
    client: &dyn CatalogConnector,
    asset: Asset,
    options: SaveOptions,
) -> AtlanResult<Option<Asset>> {
    let type_name = asset.type_name.clone();
    let qualified_name = asset.qualified_name().unwrap_or_default().to_string();
    let span = asset_span!(type_name, qualified_name);

    async move {
        let response = client.save(vec![asset], options).await?;
        debug!(
            created = response.created_assets().len(),
            updated = response.updated_assets().len(),
            "Saved asset"
        );
        Ok(updated_asset(&response, &type_name, &qualified_name))
    }
    .instrument(span)
    .await
}

/// Saves an updater, failing with `NotFound` instead of creating the asset
/// when nothing exists under its qualified name.
async fn save_to_existing(client: &dyn CatalogConnector, asset: Asset) -> AtlanResult<Option<Asset>> {
    let qualified_name = asset.qualified_name().unwrap_or_default().to_string();
    client
        .get_by_qualified_name(&asset.type_name, &qualified_name, true, true)
        .await?;
    save_one(client, asset, SaveOptions::default()).await
}

async fn save_with_cleared(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    name: &str,
    cleared: &[&str],
) -> AtlanResult<Option<Asset>> {
    let mut asset = Asset::updater(type_name, qualified_name, name)?;
    for key in cleared {
        asset.clear_attribute(key);
    }
    save_to_existing(client, asset).await
}

pub async fn remove_description(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    name: &str,
) -> AtlanResult<Option<Asset>> {
    save_with_cleared(client, type_name, qualified_name, name, &[attr::DESCRIPTION]).await
}

pub async fn remove_user_description(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    name: &str,
) -> AtlanResult<Option<Asset>> {
    save_with_cleared(
        client,
        type_name,
        qualified_name,
        name,
        &[attr::USER_DESCRIPTION],
    )
    .await
}

pub async fn remove_owners(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    name: &str,
) -> AtlanResult<Option<Asset>> {
    save_with_cleared(
        client,
        type_name,
        qualified_name,
        name,
        &[attr::OWNER_USERS, attr::OWNER_GROUPS],
    )
    .await
}

pub async fn update_certificate(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    name: &str,
    status: CertificateStatus,
    message: Option<&str>,
) -> AtlanResult<Option<Asset>> {
    let mut asset = Asset::updater(type_name, qualified_name, name)?;
    asset.set_attribute(attr::CERTIFICATE_STATUS, status.as_str());
    if let Some(message) = message {
        asset.set_attribute(attr::CERTIFICATE_STATUS_MESSAGE, message);
    }
    save_to_existing(client, asset).await
}

pub async fn remove_certificate(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    name: &str,
) -> AtlanResult<Option<Asset>> {
    save_with_cleared(
        client,
        type_name,
        qualified_name,
        name,
        &[attr::CERTIFICATE_STATUS, attr::CERTIFICATE_STATUS_MESSAGE],
    )
    .await
}

pub async fn update_announcement(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    name: &str,
    announcement_type: AnnouncementType,
    title: &str,
    message: Option<&str>,
) -> AtlanResult<Option<Asset>> {
    let mut asset = Asset::updater(type_name, qualified_name, name)?;
    asset.set_attribute(attr::ANNOUNCEMENT_TYPE, announcement_type.as_str());
    asset.set_attribute(attr::ANNOUNCEMENT_TITLE, title);
    if let Some(message) = message {
        asset.set_attribute(attr::ANNOUNCEMENT_MESSAGE, message);
    }
    save_to_existing(client, asset).await
}

pub async fn remove_announcement(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    name: &str,
) -> AtlanResult<Option<Asset>> {
    save_with_cleared(
        client,
        type_name,
        qualified_name,
        name,
        &[
            attr::ANNOUNCEMENT_TYPE,
            attr::ANNOUNCEMENT_TITLE,
            attr::ANNOUNCEMENT_MESSAGE,
        ],
    )
    .await
}

/// Strips read-side detail so a reference can be sent back.
fn minimal_ref(reference: &AssetRef) -> AssetRef {
    match reference.guid() {
        Some(guid) => AssetRef::by_guid(&reference.type_name, guid),
        None => AssetRef::by_qualified_name(
            &reference.type_name,
            reference.qualified_name().unwrap_or_default(),
        ),
    }
}

fn with_terms(mut asset: Asset, terms: &[AssetRef]) -> Asset {
    if terms.is_empty() {
        asset.clear_attribute(attr::MEANINGS);
    } else {
        asset.set_references(attr::MEANINGS, terms.iter().map(minimal_ref).collect());
    }
    asset
}

/// Replaces all assigned terms. An empty list removes every term.
pub async fn replace_terms(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    name: &str,
    terms: &[AssetRef],
) -> AtlanResult<Option<Asset>> {
    let asset = with_terms(Asset::updater(type_name, qualified_name, name)?, terms);
    save_to_existing(client, asset).await
}

async fn existing_with_relationships(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
) -> AtlanResult<(Asset, String)> {
    let existing = get_by_qualified_name(client, type_name, qualified_name, true).await?;
    let name = existing
        .name()
        .ok_or_else(|| AtlanError::InvalidResponse(format!("{} has no name", qualified_name)))?
        .to_string();
    Ok((existing, name))
}

/// Gives every reference a GUID, looking up those that only carry a
/// qualified name. Terms read back from the server are identified by GUID.
async fn resolve_guids(
    client: &dyn CatalogConnector,
    references: &[AssetRef],
) -> AtlanResult<Vec<AssetRef>> {
    let mut resolved = Vec::with_capacity(references.len());
    for reference in references {
        if reference.guid().is_some() {
            resolved.push(reference.clone());
            continue;
        }
        let qualified_name = reference
            .qualified_name()
            .ok_or_else(|| AtlanError::missing_reference_identity(&reference.type_name))?;
        let target = client
            .get_by_qualified_name(&reference.type_name, qualified_name, true, true)
            .await?;
        let guid = target
            .guid
            .ok_or_else(|| AtlanError::InvalidResponse(format!("{} has no GUID", qualified_name)))?;
        let mut by_guid = AssetRef::by_guid(&reference.type_name, guid);
        by_guid.unique_attributes = reference.unique_attributes.clone();
        resolved.push(by_guid);
    }
    Ok(resolved)
}

/// Adds terms to those already assigned, skipping ones already present.
pub async fn append_terms(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    terms: &[AssetRef],
) -> AtlanResult<Option<Asset>> {
    let (existing, name) = existing_with_relationships(client, type_name, qualified_name).await?;
    let terms = resolve_guids(client, terms).await?;
    let mut combined: Vec<AssetRef> = existing
        .assigned_terms()
        .into_iter()
        .filter(AssetRef::is_active)
        .collect();
    let before = combined.len();
    for term in terms {
        if !combined.iter().any(|t| t.same_target(&term)) {
            combined.push(term);
        }
    }
    if combined.len() == before {
        return Ok(None);
    }

    let asset = with_terms(Asset::updater(type_name, qualified_name, &name)?, &combined);
    save_one(client, asset, SaveOptions::default()).await
}

/// Removes terms from those assigned; terms not assigned are ignored.
pub async fn remove_terms(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    terms: &[AssetRef],
) -> AtlanResult<Option<Asset>> {
    let (existing, name) = existing_with_relationships(client, type_name, qualified_name).await?;
    let terms = resolve_guids(client, terms).await?;
    let current: Vec<AssetRef> = existing
        .assigned_terms()
        .into_iter()
        .filter(AssetRef::is_active)
        .collect();
    let remaining: Vec<AssetRef> = current
        .iter()
        .filter(|t| !terms.iter().any(|r| r.same_target(t)))
        .cloned()
        .collect();
    if remaining.len() == current.len() {
        return Ok(None);
    }

    let asset = with_terms(Asset::updater(type_name, qualified_name, &name)?, &remaining);
    save_one(client, asset, SaveOptions::default()).await
}

fn direct_tags(asset: &Asset) -> Vec<AtlanTag> {
    asset
        .atlan_tags()
        .iter()
        .filter(|t| t.is_direct_on(asset.guid.as_deref()))
        .map(|t| AtlanTag {
            entity_guid: None,
            entity_status: None,
            ..t.clone()
        })
        .collect()
}

/// Adds tags by name to those directly on the asset. Tags already present
/// keep their existing propagation settings.
pub async fn append_atlan_tags(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    names: &[&str],
    propagate: bool,
    remove_propagations_on_delete: bool,
    restrict_lineage_propagation: bool,
) -> AtlanResult<Option<Asset>> {
    let (existing, name) = existing_with_relationships(client, type_name, qualified_name).await?;
    let mut tags = direct_tags(&existing);
    let before = tags.len();
    for tag_name in names {
        if !tags.iter().any(|t| t.type_name == *tag_name) {
            tags.push(AtlanTag::of(*tag_name).with_propagation(
                propagate,
                remove_propagations_on_delete,
                restrict_lineage_propagation,
            ));
        }
    }
    if tags.len() == before {
        return Ok(None);
    }

    let mut asset = Asset::updater(type_name, qualified_name, &name)?;
    asset.classifications = Some(tags);
    save_one(client, asset, SaveOptions::replacing_tags()).await
}

/// Removes one tag from the asset. Fails with `NotFound` when the tag is
/// not directly on the asset.
pub async fn remove_atlan_tag(
    client: &dyn CatalogConnector,
    type_name: &str,
    qualified_name: &str,
    tag_name: &str,
) -> AtlanResult<Option<Asset>> {
    let (existing, name) = existing_with_relationships(client, type_name, qualified_name).await?;
    let mut tags = direct_tags(&existing);
    let before = tags.len();
    tags.retain(|t| t.type_name != tag_name);
    if tags.len() == before {
        return Err(AtlanError::NotFound(format!(
            "Atlan tag {} is not assigned to {} {}",
            tag_name, type_name, qualified_name
        )));
    }

    let mut asset = Asset::updater(type_name, qualified_name, &name)?;
    asset.classifications = Some(tags);
    save_one(client, asset, SaveOptions::replacing_tags()).await
}
