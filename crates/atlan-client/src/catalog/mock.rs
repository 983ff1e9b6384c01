//! In-memory catalog connector for testing.
//!
//! Behaves like the server for the operations the SDK relies on: GUID
//! assignment, partial updates where `null` clears, tag replacement and
//! appending, archive / purge / restore, and index search over the stored
//! assets. Tags are indexed under their display names.

use crate::assets::super_types_of;
use crate::model::{
    attr, Asset, AssetRef, AtlanTag, DeleteType, EntityStatus, MutationResponse, TypeDefCategory,
    TypeDefResponse, UniqueAttributes,
};
use crate::search::{
    Aggregation, AggregationBucket, AggregationResult, BoolQuery, IndexSearchRequest,
    IndexSearchResponse, Query, SortItem, SortOrder,
};
use crate::traits::{AtlanError, AtlanResult, CatalogConnector, ConnectorHealth, SaveOptions};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

const MOCK_USER: &str = "mock-user";

/// Mock catalog connector for testing.
pub struct MockCatalogConnector {
    name: String,
    assets: Arc<RwLock<Vec<Asset>>>,
    typedefs: Arc<RwLock<TypeDefResponse>>,
}

impl MockCatalogConnector {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            assets: Arc::new(RwLock::new(Vec::new())),
            typedefs: Arc::new(RwLock::new(TypeDefResponse::default())),
        }
    }

    /// A mock pre-loaded with assets. Assets without a GUID get one.
    pub fn with_assets(name: &str, assets: Vec<Asset>) -> Self {
        let stored = assets
            .into_iter()
            .map(|mut a| {
                if a.guid.is_none() || a.has_temporary_guid() {
                    a.guid = Some(Uuid::new_v4().to_string());
                }
                a.status.get_or_insert(EntityStatus::Active);
                mark_direct(&mut a);
                a
            })
            .collect();
        Self {
            name: name.to_string(),
            assets: Arc::new(RwLock::new(stored)),
            typedefs: Arc::new(RwLock::new(TypeDefResponse::default())),
        }
    }

    /// Snapshot of every stored asset, archived ones included.
    pub async fn assets(&self) -> Vec<Asset> {
        self.assets.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.assets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.assets.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.assets.write().await.clear();
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Records the asset itself as the source of tags that name no source.
fn mark_direct(asset: &mut Asset) {
    let guid = asset.guid.clone();
    if let Some(tags) = asset.classifications.as_mut() {
        for tag in tags.iter_mut().filter(|t| t.entity_guid.is_none()) {
            tag.entity_guid = guid.clone();
            tag.entity_status = Some(EntityStatus::Active);
        }
    }
}

fn find_index(store: &[Asset], asset: &Asset) -> AtlanResult<Option<usize>> {
    if let Some(guid) = asset.guid.as_deref().filter(|_| !asset.has_temporary_guid()) {
        return store
            .iter()
            .position(|a| a.guid.as_deref() == Some(guid))
            .map(Some)
            .ok_or_else(|| AtlanError::asset_not_found_by_guid(guid));
    }
    Ok(asset.qualified_name().and_then(|qn| {
        store
            .iter()
            .position(|a| a.type_name == asset.type_name && a.qualified_name() == Some(qn))
    }))
}

/// Fills in both GUID and qualified name on references to stored assets.
fn resolve_references(
    value: &mut Value,
    store: &[Asset],
    assignments: &HashMap<String, String>,
) {
    match value {
        Value::Array(items) => {
            for item in items {
                resolve_references(item, store, assignments);
            }
        }
        Value::Object(map) if map.contains_key("typeName") => {
            let Ok(mut reference) = serde_json::from_value::<AssetRef>(Value::Object(map.clone()))
            else {
                return;
            };
            if let Some(assigned) = reference.guid().and_then(|g| assignments.get(g)) {
                reference.guid = Some(assigned.clone());
            }
            let target = store.iter().find(|a| match reference.guid() {
                Some(guid) => a.guid.as_deref() == Some(guid),
                None => {
                    a.type_name == reference.type_name
                        && a.qualified_name().is_some()
                        && a.qualified_name() == reference.qualified_name()
                }
            });
            if let Some(target) = target {
                let mut resolved = AssetRef::by_guid(
                    &target.type_name,
                    target.guid.clone().unwrap_or_default(),
                );
                resolved.unique_attributes = Some(UniqueAttributes {
                    qualified_name: target.qualified_name().map(str::to_string),
                });
                if let Ok(v) = serde_json::to_value(resolved) {
                    *value = v;
                }
            }
        }
        _ => {}
    }
}

fn merge_tags(existing: &[AtlanTag], incoming: &[AtlanTag]) -> Vec<AtlanTag> {
    let mut merged = existing.to_vec();
    for tag in incoming {
        if !merged.iter().any(|t| t.type_name == tag.type_name) {
            merged.push(tag.clone());
        }
    }
    merged
}

/// Applies an incoming asset onto the stored one. Returns whether anything
/// changed.
fn apply_update(stored: &mut Asset, incoming: Asset, options: SaveOptions) -> bool {
    let before = stored.clone();

    for (key, value) in incoming.attributes {
        if value.is_null() {
            stored.attributes.remove(&key);
            stored.relationship_attributes.remove(&key);
        } else {
            stored.attributes.insert(key, value);
        }
    }
    for (key, value) in incoming.relationship_attributes {
        if value.is_null() {
            stored.relationship_attributes.remove(&key);
        } else {
            stored.relationship_attributes.insert(key, value);
        }
    }

    if let Some(tags) = incoming.classifications {
        let current = stored.classifications.clone().unwrap_or_default();
        if options.replace_atlan_tags {
            // Tags propagated from elsewhere are not replaced.
            let guid = stored.guid.clone();
            let mut next: Vec<AtlanTag> = current
                .into_iter()
                .filter(|t| !t.is_direct_on(guid.as_deref()))
                .collect();
            next.extend(tags);
            stored.classifications = Some(next);
        } else if options.append_atlan_tags {
            stored.classifications = Some(merge_tags(&current, &tags));
        }
        mark_direct(stored);
    }

    let changed = *stored != before;
    if changed {
        stored.update_time = Some(now_millis());
        stored.updated_by = Some(MOCK_USER.to_string());
    }
    changed
}

/// Position among the creates planned so far in a batch.
fn planned_index(planned: &[(&str, &str)], asset: &Asset) -> Option<usize> {
    let qn = asset.qualified_name()?;
    planned
        .iter()
        .position(|(type_name, planned_qn)| *type_name == asset.type_name && *planned_qn == qn)
}

fn validate_create(asset: &Asset) -> AtlanResult<()> {
    let mut missing = Vec::new();
    if asset.type_name.is_empty() {
        missing.push("typeName");
    }
    if asset.qualified_name().is_none() {
        missing.push(attr::QUALIFIED_NAME);
    }
    if missing.is_empty() {
        return Ok(());
    }
    let type_name = if asset.type_name.is_empty() {
        "asset"
    } else {
        asset.type_name.as_str()
    };
    Err(AtlanError::missing_parameters(type_name, &missing))
}

fn create(mut incoming: Asset) -> Asset {
    if let Some(qn) = incoming.unique_attributes.take().and_then(|u| u.qualified_name) {
        if incoming.str_attribute(attr::QUALIFIED_NAME).is_none() {
            incoming.set_attribute(attr::QUALIFIED_NAME, qn);
        }
    }
    incoming.attributes.retain(|_, v| !v.is_null());
    incoming.guid = Some(Uuid::new_v4().to_string());
    incoming.status = Some(EntityStatus::Active);
    let now = now_millis();
    incoming.create_time = Some(now);
    incoming.update_time = Some(now);
    incoming.created_by = Some(MOCK_USER.to_string());
    incoming.updated_by = Some(MOCK_USER.to_string());
    mark_direct(&mut incoming);
    incoming
}

#[async_trait]
impl crate::traits::Connector for MockCatalogConnector {
    fn name(&self) -> &str {
        &self.name
    }

    fn connector_type(&self) -> &str {
        "mock"
    }

    async fn health_check(&self) -> AtlanResult<ConnectorHealth> {
        Ok(ConnectorHealth::Healthy)
    }

    async fn test_connection(&self) -> AtlanResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl CatalogConnector for MockCatalogConnector {
    async fn get_by_guid(
        &self,
        guid: &str,
        _min_ext_info: bool,
        ignore_relationships: bool,
    ) -> AtlanResult<Asset> {
        let store = self.assets.read().await;
        let mut asset = store
            .iter()
            .find(|a| a.guid.as_deref() == Some(guid))
            .cloned()
            .ok_or_else(|| AtlanError::asset_not_found_by_guid(guid))?;
        if ignore_relationships {
            asset.relationship_attributes = Map::new();
        }
        Ok(asset)
    }

    async fn get_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
        _min_ext_info: bool,
        ignore_relationships: bool,
    ) -> AtlanResult<Asset> {
        let store = self.assets.read().await;
        let mut asset = store
            .iter()
            .find(|a| a.type_name == type_name && a.qualified_name() == Some(qualified_name))
            .cloned()
            .ok_or_else(|| {
                AtlanError::asset_not_found_by_qualified_name(type_name, qualified_name)
            })?;
        if ignore_relationships {
            asset.relationship_attributes = Map::new();
        }
        Ok(asset)
    }

    async fn save(
        &self,
        assets: Vec<Asset>,
        options: SaveOptions,
    ) -> AtlanResult<MutationResponse> {
        let mut store = self.assets.write().await;
        let mut response = MutationResponse::default();

        // Validate the whole batch before touching the store. Creates land at
        // the end of the store in batch order, so a later asset with the same
        // identity merges into the earlier one.
        let mut targets = Vec::with_capacity(assets.len());
        let mut planned: Vec<(&str, &str)> = Vec::new();
        for asset in &assets {
            let mut target = find_index(&store, asset)?;
            if target.is_none() {
                target = planned_index(&planned, asset).map(|i| store.len() + i);
            }
            if target.is_none() {
                validate_create(asset)?;
                if let Some(qn) = asset.qualified_name() {
                    planned.push((asset.type_name.as_str(), qn));
                }
            }
            targets.push(target);
        }
        let batch_start = store.len();

        for (mut incoming, target) in assets.into_iter().zip(targets) {
            let temporary = incoming.guid.clone().filter(|_| incoming.has_temporary_guid());
            for value in incoming
                .attributes
                .values_mut()
                .chain(incoming.relationship_attributes.values_mut())
            {
                resolve_references(value, &store, &response.guid_assignments);
            }

            match target {
                Some(index) => {
                    let stored = &mut store[index];
                    if let (Some(temp), Some(guid)) = (temporary, stored.guid.clone()) {
                        response.guid_assignments.insert(temp, guid);
                    }
                    if apply_update(stored, incoming, options) {
                        if index >= batch_start {
                            response.mutated_entities.create[index - batch_start] = stored.clone();
                        } else {
                            response.mutated_entities.update.push(stored.clone());
                        }
                    }
                }
                None => {
                    let created = create(incoming);
                    if let (Some(temp), Some(guid)) = (temporary, created.guid.clone()) {
                        response.guid_assignments.insert(temp, guid);
                    }
                    response.mutated_entities.create.push(created.clone());
                    store.push(created);
                }
            }
        }

        Ok(response)
    }

    async fn delete(
        &self,
        guids: &[String],
        delete_type: DeleteType,
    ) -> AtlanResult<MutationResponse> {
        let mut store = self.assets.write().await;
        if let Some(missing) = guids
            .iter()
            .find(|g| !store.iter().any(|a| a.guid.as_ref() == Some(*g)))
        {
            return Err(AtlanError::asset_not_found_by_guid(missing));
        }

        let mut response = MutationResponse::default();
        for guid in guids {
            let Some(index) = store.iter().position(|a| a.guid.as_ref() == Some(guid)) else {
                continue;
            };
            match delete_type {
                DeleteType::Soft => {
                    let asset = &mut store[index];
                    if asset.status != Some(EntityStatus::Deleted) {
                        asset.status = Some(EntityStatus::Deleted);
                        asset.update_time = Some(now_millis());
                        response.mutated_entities.delete.push(asset.clone());
                    }
                }
                DeleteType::Hard => {
                    let mut asset = store.remove(index);
                    asset.status = Some(EntityStatus::Purged);
                    response.mutated_entities.delete.push(asset);
                }
            }
        }
        Ok(response)
    }

    async fn restore(&self, guids: &[String]) -> AtlanResult<MutationResponse> {
        let mut store = self.assets.write().await;
        let mut response = MutationResponse::default();
        for guid in guids {
            let asset = store
                .iter_mut()
                .find(|a| a.guid.as_ref() == Some(guid))
                .ok_or_else(|| AtlanError::asset_not_found_by_guid(guid))?;
            if asset.status == Some(EntityStatus::Deleted) {
                asset.status = Some(EntityStatus::Active);
                asset.update_time = Some(now_millis());
                response.mutated_entities.partial_update.push(asset.clone());
            }
        }
        Ok(response)
    }

    async fn search(&self, request: &IndexSearchRequest) -> AtlanResult<IndexSearchResponse> {
        let store = self.assets.read().await;
        let mut matched: Vec<&Asset> = store
            .iter()
            .filter(|a| matches(&request.dsl.query, a))
            .collect();

        if !request.dsl.sort.is_empty() {
            matched.sort_by(|a, b| compare(&request.dsl.sort, a, b));
        }

        let aggregations = request
            .dsl
            .aggregations
            .iter()
            .map(|(name, agg)| (name.clone(), aggregate(agg, &matched)))
            .collect();

        let entities = matched
            .iter()
            .skip(request.dsl.from)
            .take(request.dsl.size)
            .map(|a| (*a).clone())
            .collect();

        Ok(IndexSearchResponse {
            approximate_count: matched.len() as u64,
            entities,
            aggregations,
        })
    }

    async fn get_typedefs(&self, category: TypeDefCategory) -> AtlanResult<TypeDefResponse> {
        Ok(self.typedefs.read().await.only(category))
    }

    async fn create_typedefs(&self, typedefs: &TypeDefResponse) -> AtlanResult<TypeDefResponse> {
        let mut stored = self.typedefs.write().await;
        let mut created = typedefs.clone();

        for def in created.classification_defs.iter_mut() {
            if stored
                .classification_defs
                .iter()
                .any(|d| d.display_name == def.display_name)
            {
                return Err(AtlanError::Conflict(format!(
                    "Atlan tag {} already exists",
                    def.display_name
                )));
            }
            if def.name.is_empty() {
                def.name = Uuid::new_v4().simple().to_string();
            }
            def.guid.get_or_insert_with(|| Uuid::new_v4().to_string());
        }
        for def in &created.enum_defs {
            if stored.enum_defs.iter().any(|d| d.name == def.name) {
                return Err(AtlanError::Conflict(format!("Enum {} already exists", def.name)));
            }
        }
        for def in created.business_metadata_defs.iter_mut() {
            if def.name.is_empty() {
                def.name = Uuid::new_v4().simple().to_string();
            }
        }

        stored.classification_defs.extend(created.classification_defs.iter().cloned());
        stored.enum_defs.extend(created.enum_defs.iter().cloned());
        stored.struct_defs.extend(created.struct_defs.iter().cloned());
        stored
            .business_metadata_defs
            .extend(created.business_metadata_defs.iter().cloned());
        stored.entity_defs.extend(created.entity_defs.iter().cloned());
        Ok(created)
    }

    async fn purge_typedef(&self, internal_name: &str) -> AtlanResult<()> {
        let mut stored = self.typedefs.write().await;
        let before = (
            stored.classification_defs.len(),
            stored.enum_defs.len(),
            stored.struct_defs.len(),
            stored.business_metadata_defs.len(),
            stored.entity_defs.len(),
        );
        stored.classification_defs.retain(|d| d.name != internal_name);
        stored.enum_defs.retain(|d| d.name != internal_name);
        stored.struct_defs.retain(|d| d.name != internal_name);
        stored.business_metadata_defs.retain(|d| d.name != internal_name);
        stored.entity_defs.retain(|d| d.name != internal_name);
        let after = (
            stored.classification_defs.len(),
            stored.enum_defs.len(),
            stored.struct_defs.len(),
            stored.business_metadata_defs.len(),
            stored.entity_defs.len(),
        );
        if before == after {
            return Err(AtlanError::NotFound(format!(
                "Type definition {} does not exist",
                internal_name
            )));
        }
        Ok(())
    }

    async fn atlan_tag_id(&self, display_name: &str) -> AtlanResult<String> {
        Ok(display_name.to_string())
    }
}

// ----- search evaluation -----

fn scalar_values(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().flat_map(scalar_values).collect(),
        Value::Object(_) => serde_json::from_value::<AssetRef>(value.clone())
            .ok()
            .and_then(|r| r.qualified_name().map(|qn| Value::String(qn.to_string())))
            .into_iter()
            .collect(),
        other => vec![other.clone()],
    }
}

fn strings(items: Vec<&str>) -> Vec<Value> {
    items.into_iter().map(|s| Value::String(s.to_string())).collect()
}

/// Indexed values of a field on an asset.
fn field_values(asset: &Asset, field: &str) -> Vec<Value> {
    let field = field.strip_suffix(".keyword").unwrap_or(field);
    let guid = asset.guid.as_deref();
    match field {
        "__typeName" => strings(vec![asset.type_name.as_str()]),
        "__superTypeNames" => strings(super_types_of(&asset.type_name).to_vec()),
        "__guid" => strings(guid.into_iter().collect()),
        "__state" => strings(vec![asset.status.unwrap_or(EntityStatus::Active).as_str()]),
        "__traitNames" => strings(
            asset
                .atlan_tags()
                .iter()
                .filter(|t| t.is_direct_on(guid))
                .map(|t| t.type_name.as_str())
                .collect(),
        ),
        "__propagatedTraitNames" => strings(
            asset
                .atlan_tags()
                .iter()
                .filter(|t| !t.is_direct_on(guid))
                .map(|t| t.type_name.as_str())
                .collect(),
        ),
        "__meanings" => asset
            .assigned_terms()
            .iter()
            .filter_map(|t| t.qualified_name().map(|qn| Value::String(qn.to_string())))
            .collect(),
        "__timestamp" => asset.create_time.map(Value::from).into_iter().collect(),
        "__modificationTimestamp" => asset.update_time.map(Value::from).into_iter().collect(),
        "qualifiedName" => strings(asset.qualified_name().into_iter().collect()),
        other => asset.attribute(other).map(scalar_values).unwrap_or_default(),
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y),
        _ => match (a.as_str(), b.as_str()) {
            (Some(x), Some(y)) => Some(x.cmp(y)),
            _ => None,
        },
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    a == b || compare_values(a, b) == Some(Ordering::Equal)
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn in_range(
    value: &Value,
    gt: &Option<Value>,
    gte: &Option<Value>,
    lt: &Option<Value>,
    lte: &Option<Value>,
) -> bool {
    let check = |bound: &Option<Value>, ok: fn(Ordering) -> bool| match bound {
        Some(b) => compare_values(value, b).is_some_and(ok),
        None => true,
    };
    check(gt, |o| o == Ordering::Greater)
        && check(gte, |o| o != Ordering::Less)
        && check(lt, |o| o == Ordering::Less)
        && check(lte, |o| o != Ordering::Greater)
}

fn matches_bool(query: &BoolQuery, asset: &Asset) -> bool {
    if !query.filter.iter().chain(query.must.iter()).all(|q| matches(q, asset)) {
        return false;
    }
    if query.must_not.iter().any(|q| matches(q, asset)) {
        return false;
    }
    if query.should.is_empty() {
        return true;
    }
    let required = query.minimum_should_match.unwrap_or(
        if query.filter.is_empty() && query.must.is_empty() { 1 } else { 0 },
    ) as usize;
    query.should.iter().filter(|q| matches(q, asset)).count() >= required
}

fn matches(query: &Query, asset: &Asset) -> bool {
    match query {
        Query::MatchAll => true,
        Query::Term { field, value } => field_values(asset, field)
            .iter()
            .any(|v| values_equal(v, value)),
        Query::Terms { field, values } => field_values(asset, field)
            .iter()
            .any(|v| values.iter().any(|w| values_equal(v, w))),
        Query::Prefix { field, value } => field_values(asset, field)
            .iter()
            .any(|v| v.as_str().is_some_and(|s| s.starts_with(value.as_str()))),
        Query::Exists { field } => !field_values(asset, field).is_empty(),
        Query::Range {
            field,
            gt,
            gte,
            lt,
            lte,
        } => field_values(asset, field)
            .iter()
            .any(|v| in_range(v, gt, gte, lt, lte)),
        Query::Match { field, value } => {
            let wanted = tokens(value);
            field_values(asset, field).iter().any(|v| {
                v.as_str()
                    .is_some_and(|text| tokens(text).iter().any(|t| wanted.contains(t)))
            })
        }
        Query::Bool(b) => matches_bool(b, asset),
    }
}

/// Orders assets by the sort keys; assets missing a key sort last.
fn compare(sort: &[SortItem], a: &Asset, b: &Asset) -> Ordering {
    for item in sort {
        let left = field_values(a, &item.field).into_iter().next();
        let right = field_values(b, &item.field).into_iter().next();
        let ordering = match (&left, &right) {
            (Some(x), Some(y)) => {
                let o = compare_values(x, y).unwrap_or(Ordering::Equal);
                match item.order {
                    SortOrder::Asc => o,
                    SortOrder::Desc => o.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn bucket_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn aggregate(aggregation: &Aggregation, assets: &[&Asset]) -> AggregationResult {
    match aggregation {
        Aggregation::Terms { field, size } => {
            let mut counts: BTreeMap<String, u64> = BTreeMap::new();
            for asset in assets {
                let mut keys: Vec<String> =
                    field_values(asset, field).iter().map(bucket_key).collect();
                keys.sort();
                keys.dedup();
                for key in keys {
                    *counts.entry(key).or_default() += 1;
                }
            }
            let mut buckets: Vec<AggregationBucket> = counts
                .into_iter()
                .map(|(key, doc_count)| AggregationBucket { key, doc_count })
                .collect();
            buckets.sort_by(|a, b| b.doc_count.cmp(&a.doc_count).then_with(|| a.key.cmp(&b.key)));
            buckets.truncate(*size);
            AggregationResult { buckets }
        }
    }
}
