//! Translation between human-readable tag names and their internal ids.
//!
//! The server stores tags under generated internal names; SDK code works with
//! display names. Both directions are cached with a TTL and the whole cache
//! is reloaded from the type registry on a miss.

use crate::http::{HttpClient, ResponseCache};
use crate::model::{AtlanTagDef, TypeDefCategory, TypeDefResponse};
use crate::traits::{AtlanError, AtlanResult};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Display name reported for tag ids that no longer have a definition.
pub const DELETED_TAG_NAME: &str = "(DELETED)";

const TYPEDEFS_PATH: &str = "api/meta/types/typedefs";
const MAX_TAGS: u64 = 10_000;

pub struct AtlanTagCache {
    ids_by_name: ResponseCache<String>,
    names_by_id: ResponseCache<String>,
    refresh_lock: Mutex<()>,
}

impl AtlanTagCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ids_by_name: ResponseCache::new(ttl, MAX_TAGS),
            names_by_id: ResponseCache::new(ttl, MAX_TAGS),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Replaces the cached mapping with the given definitions.
    pub async fn populate(&self, defs: &[AtlanTagDef]) {
        self.ids_by_name.clear().await;
        self.names_by_id.clear().await;
        for def in defs.iter().filter(|d| !d.name.is_empty()) {
            self.ids_by_name
                .insert(def.display_name.clone(), def.name.clone())
                .await;
            self.names_by_id
                .insert(def.name.clone(), def.display_name.clone())
                .await;
        }
        debug!(count = defs.len(), "Tag cache populated");
    }

    /// Reloads all tag definitions from the server.
    pub async fn refresh(&self, client: &HttpClient) -> AtlanResult<()> {
        let _guard = self.refresh_lock.lock().await;
        self.reload(client).await
    }

    /// Callers hold `refresh_lock`.
    async fn reload(&self, client: &HttpClient) -> AtlanResult<()> {
        info!("Refreshing Atlan tag cache");
        let query = [("type", TypeDefCategory::AtlanTag.query_value().to_string())];
        let defs: TypeDefResponse = client.get_json(TYPEDEFS_PATH, &query).await?;
        self.populate(&defs.classification_defs).await;
        Ok(())
    }

    pub async fn invalidate(&self) {
        self.ids_by_name.clear().await;
        self.names_by_id.clear().await;
    }

    pub async fn cached_id(&self, name: &str) -> Option<String> {
        self.ids_by_name.get(name).await
    }

    pub async fn cached_name(&self, id: &str) -> Option<String> {
        self.names_by_id.get(id).await
    }

    /// Internal id for a tag's display name.
    pub async fn id_for(&self, client: &HttpClient, name: &str) -> AtlanResult<String> {
        if let Some(id) = self.cached_id(name).await {
            return Ok(id);
        }
        let _guard = self.refresh_lock.lock().await;
        // Another caller may have reloaded while we waited.
        if let Some(id) = self.cached_id(name).await {
            return Ok(id);
        }
        self.reload(client).await?;
        self.cached_id(name)
            .await
            .ok_or_else(|| AtlanError::NotFound(format!("Atlan tag with name {} does not exist", name)))
    }

    /// Display name for an internal id; ids of deleted tags read as
    /// [`DELETED_TAG_NAME`] and are remembered as such until the next reload.
    pub async fn name_for(&self, client: &HttpClient, id: &str) -> AtlanResult<String> {
        if let Some(name) = self.cached_name(id).await {
            return Ok(name);
        }
        let _guard = self.refresh_lock.lock().await;
        if let Some(name) = self.cached_name(id).await {
            return Ok(name);
        }
        self.reload(client).await?;
        match self.cached_name(id).await {
            Some(name) => Ok(name),
            None => {
                debug!(id, "No definition for tag id");
                self.names_by_id
                    .insert(id.to_string(), DELETED_TAG_NAME.to_string())
                    .await;
                Ok(DELETED_TAG_NAME.to_string())
            }
        }
    }
}
