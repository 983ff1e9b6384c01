//! Atlan REST connector.
//!
//! Talks to a tenant's metadata API. Tags are exchanged with the server under
//! their internal ids and translated to display names on the way in and out.

use super::tag_cache::AtlanTagCache;
use crate::http::{HttpClient, RateLimitConfig};
use crate::model::{Asset, DeleteType, MutationResponse, TypeDefCategory, TypeDefResponse};
use crate::secure_string::SecureString;
use crate::search::{IndexSearchRequest, IndexSearchResponse, DEFAULT_PAGE_SIZE};
use crate::traits::{
    AtlanError, AtlanResult, AuthConfig, CatalogConnector, ClientConfig, ConnectorHealth,
    SaveOptions,
};
use async_trait::async_trait;
use atlan_observability::metrics::register_metrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

const ENTITY_BY_GUID: &str = "api/meta/entity/guid";
const ENTITY_BY_UNIQUE_ATTRIBUTE: &str = "api/meta/entity/uniqueAttribute/type";
const ENTITY_BULK: &str = "api/meta/entity/bulk";
const ENTITY_RESTORE_BULK: &str = "api/meta/entity/restore/bulk";
const INDEX_SEARCH: &str = "api/meta/search/indexsearch";
const TYPEDEFS: &str = "api/meta/types/typedefs";
const TYPEDEF_BY_NAME: &str = "api/meta/types/typedef/name";
const CURRENT_USER: &str = "api/service/users/current";

pub const ENV_BASE_URL: &str = "ATLAN_BASE_URL";
pub const ENV_API_KEY: &str = "ATLAN_API_KEY";

/// Atlan connector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlanConfig {
    #[serde(flatten)]
    pub client: ClientConfig,
    /// Page size for searches that do not set their own.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_tag_cache_ttl_secs")]
    pub tag_cache_ttl_secs: u64,
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_tag_cache_ttl_secs() -> u64 {
    600
}

impl AtlanConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: ClientConfig {
                name: "atlan".to_string(),
                base_url: base_url.into(),
                auth: AuthConfig::ApiToken {
                    token: SecureString::new(api_key.into()),
                },
                timeout_secs: 30,
                max_retries: 3,
                verify_tls: true,
                headers: HashMap::new(),
            },
            page_size: default_page_size(),
            tag_cache_ttl_secs: default_tag_cache_ttl_secs(),
            rate_limit: None,
        }
    }

    /// Reads `ATLAN_BASE_URL` and `ATLAN_API_KEY` from the environment.
    pub fn from_env() -> AtlanResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AtlanResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AtlanError::Configuration(format!("{} is not set", key)))
        };
        Ok(Self::new(read(ENV_BASE_URL)?, read(ENV_API_KEY)?))
    }
}

#[derive(Deserialize)]
struct EntityResponse {
    entity: Asset,
}

#[derive(Serialize)]
struct BulkEntityRequest<'a> {
    entities: &'a [Asset],
}

/// Connector for the Atlan metadata API.
pub struct AtlanConnector {
    config: AtlanConfig,
    client: HttpClient,
    tags: AtlanTagCache,
}

impl AtlanConnector {
    pub fn new(config: AtlanConfig) -> AtlanResult<Self> {
        register_metrics();
        let client = HttpClient::with_rate_limit(config.client.clone(), config.rate_limit.clone())?;
        let tags = AtlanTagCache::new(Duration::from_secs(config.tag_cache_ttl_secs));

        info!(base_url = %config.client.base_url, "Atlan connector initialized");

        Ok(Self {
            config,
            client,
            tags,
        })
    }

    pub fn from_env() -> AtlanResult<Self> {
        Self::new(AtlanConfig::from_env()?)
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    pub fn tag_cache(&self) -> &AtlanTagCache {
        &self.tags
    }

    /// Swaps tag display names for internal ids before sending.
    async fn tags_to_server(&self, assets: &mut [Asset]) -> AtlanResult<()> {
        for asset in assets.iter_mut() {
            if let Some(tags) = asset.classifications.as_mut() {
                for tag in tags.iter_mut() {
                    tag.type_name = self.tags.id_for(&self.client, &tag.type_name).await?;
                }
            }
        }
        Ok(())
    }

    /// Swaps internal tag ids for display names on received assets.
    async fn tags_from_server(&self, assets: &mut [Asset]) -> AtlanResult<()> {
        for asset in assets.iter_mut() {
            if let Some(tags) = asset.classifications.as_mut() {
                for tag in tags.iter_mut() {
                    tag.type_name = self.tags.name_for(&self.client, &tag.type_name).await?;
                }
            }
        }
        Ok(())
    }

    async fn mutation_from_server(&self, mut response: MutationResponse) -> AtlanResult<MutationResponse> {
        let m = &mut response.mutated_entities;
        self.tags_from_server(&mut m.create).await?;
        self.tags_from_server(&mut m.update).await?;
        self.tags_from_server(&mut m.partial_update).await?;
        self.tags_from_server(&mut m.delete).await?;
        Ok(response)
    }

    async fn fetch_entity(&self, path: &str, query: &[(&str, String)]) -> AtlanResult<Asset> {
        let response: EntityResponse = self.client.get_json(path, query).await?;
        let mut asset = response.entity;
        self.tags_from_server(std::slice::from_mut(&mut asset)).await?;
        Ok(asset)
    }
}

fn guid_params(guids: &[String]) -> Vec<(&'static str, String)> {
    guids.iter().map(|g| ("guid", g.clone())).collect()
}

#[async_trait]
impl crate::traits::Connector for AtlanConnector {
    fn name(&self) -> &str {
        &self.config.client.name
    }

    fn connector_type(&self) -> &str {
        "atlan"
    }

    fn capabilities(&self) -> Vec<String> {
        vec![
            "health_check".to_string(),
            "test_connection".to_string(),
            "get".to_string(),
            "save".to_string(),
            "delete".to_string(),
            "restore".to_string(),
            "search".to_string(),
            "typedefs".to_string(),
        ]
    }

    async fn health_check(&self) -> AtlanResult<ConnectorHealth> {
        match self.client.get(CURRENT_USER, &[]).await {
            Ok(_) => Ok(ConnectorHealth::Healthy),
            Err(AtlanError::Authentication(_)) => Ok(ConnectorHealth::Unhealthy(
                "Authentication failed".to_string(),
            )),
            Err(AtlanError::ApiConnection(e)) => Ok(ConnectorHealth::Unhealthy(format!(
                "Connection failed: {}",
                e
            ))),
            Err(AtlanError::Timeout(e)) => {
                Ok(ConnectorHealth::Unhealthy(format!("Timed out: {}", e)))
            }
            Err(e) => Ok(ConnectorHealth::Degraded(e.to_string())),
        }
    }

    async fn test_connection(&self) -> AtlanResult<bool> {
        let response = self.client.get(CURRENT_USER, &[]).await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl CatalogConnector for AtlanConnector {
    #[instrument(skip(self))]
    async fn get_by_guid(
        &self,
        guid: &str,
        min_ext_info: bool,
        ignore_relationships: bool,
    ) -> AtlanResult<Asset> {
        let path = format!("{}/{}", ENTITY_BY_GUID, guid);
        let query = [
            ("minExtInfo", min_ext_info.to_string()),
            ("ignoreRelationships", ignore_relationships.to_string()),
        ];
        self.fetch_entity(&path, &query).await.map_err(|e| match e {
            AtlanError::NotFound(_) => AtlanError::asset_not_found_by_guid(guid),
            other => other,
        })
    }

    #[instrument(skip(self))]
    async fn get_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
        min_ext_info: bool,
        ignore_relationships: bool,
    ) -> AtlanResult<Asset> {
        let path = format!("{}/{}", ENTITY_BY_UNIQUE_ATTRIBUTE, type_name);
        let query = [
            ("attr:qualifiedName", qualified_name.to_string()),
            ("minExtInfo", min_ext_info.to_string()),
            ("ignoreRelationships", ignore_relationships.to_string()),
        ];
        self.fetch_entity(&path, &query).await.map_err(|e| match e {
            AtlanError::NotFound(_) => {
                AtlanError::asset_not_found_by_qualified_name(type_name, qualified_name)
            }
            other => other,
        })
    }

    #[instrument(skip(self, assets), fields(count = assets.len()))]
    async fn save(
        &self,
        mut assets: Vec<Asset>,
        options: SaveOptions,
    ) -> AtlanResult<MutationResponse> {
        if assets.is_empty() {
            return Ok(MutationResponse::default());
        }
        self.tags_to_server(&mut assets).await?;

        let query = [
            ("replaceClassifications", options.replace_atlan_tags.to_string()),
            ("appendTags", options.append_atlan_tags.to_string()),
        ];
        let response: MutationResponse = self
            .client
            .post_json(ENTITY_BULK, &query, &BulkEntityRequest { entities: &assets })
            .await?;

        debug!(
            created = response.mutated_entities.create.len(),
            updated = response.updated_assets().len(),
            "Saved assets"
        );
        self.mutation_from_server(response).await
    }

    #[instrument(skip(self, guids), fields(count = guids.len(), delete_type = delete_type.as_str()))]
    async fn delete(
        &self,
        guids: &[String],
        delete_type: DeleteType,
    ) -> AtlanResult<MutationResponse> {
        if guids.is_empty() {
            return Ok(MutationResponse::default());
        }
        let mut query = guid_params(guids);
        query.push(("deleteType", delete_type.as_str().to_string()));
        let response: MutationResponse = self.client.delete_json(ENTITY_BULK, &query).await?;
        self.mutation_from_server(response).await
    }

    #[instrument(skip(self, guids), fields(count = guids.len()))]
    async fn restore(&self, guids: &[String]) -> AtlanResult<MutationResponse> {
        if guids.is_empty() {
            return Ok(MutationResponse::default());
        }
        let response: MutationResponse = self
            .client
            .post_json(ENTITY_RESTORE_BULK, &guid_params(guids), &serde_json::json!({}))
            .await?;
        self.mutation_from_server(response).await
    }

    #[instrument(skip(self, request), fields(from = request.dsl.from, size = request.dsl.size))]
    async fn search(&self, request: &IndexSearchRequest) -> AtlanResult<IndexSearchResponse> {
        let mut response: IndexSearchResponse =
            self.client.post_json(INDEX_SEARCH, &[], request).await?;
        self.tags_from_server(&mut response.entities).await?;
        debug!(
            count = response.approximate_count,
            returned = response.entities.len(),
            "Index search complete"
        );
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn get_typedefs(&self, category: TypeDefCategory) -> AtlanResult<TypeDefResponse> {
        let query = [("type", category.query_value().to_string())];
        self.client.get_json(TYPEDEFS, &query).await
    }

    #[instrument(skip(self, typedefs))]
    async fn create_typedefs(&self, typedefs: &TypeDefResponse) -> AtlanResult<TypeDefResponse> {
        let created: TypeDefResponse = self.client.post_json(TYPEDEFS, &[], typedefs).await?;
        if !created.classification_defs.is_empty() {
            self.tags.invalidate().await;
        }
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn purge_typedef(&self, internal_name: &str) -> AtlanResult<()> {
        let path = format!("{}/{}", TYPEDEF_BY_NAME, internal_name);
        self.client.delete(&path, &[]).await?;
        self.tags.invalidate().await;
        info!(internal_name, "Purged type definition");
        Ok(())
    }

    async fn atlan_tag_id(&self, display_name: &str) -> AtlanResult<String> {
        self.tags.id_for(&self.client, display_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Connector;

    #[test]
    fn test_from_lookup() {
        let config = AtlanConfig::from_lookup(|key| match key {
            ENV_BASE_URL => Some("https://tenant.atlan.com".to_string()),
            ENV_API_KEY => Some(" secret-token ".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.client.base_url, "https://tenant.atlan.com");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        match config.client.auth {
            AuthConfig::ApiToken { token } => assert_eq!(token.expose_secret(), "secret-token"),
            other => panic!("unexpected auth: {:?}", other),
        }
    }

    #[test]
    fn test_from_lookup_requires_both_values() {
        let err = AtlanConfig::from_lookup(|key| {
            (key == ENV_BASE_URL).then(|| "https://tenant.atlan.com".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, AtlanError::Configuration(ref m) if m.contains(ENV_API_KEY)));

        let err = AtlanConfig::from_lookup(|_| Some("  ".to_string())).unwrap_err();
        assert!(matches!(err, AtlanError::Configuration(ref m) if m.contains(ENV_BASE_URL)));
    }

    #[test]
    fn test_config_is_flattened() {
        let config: AtlanConfig = serde_json::from_value(serde_json::json!({
            "name": "prod",
            "base_url": "https://tenant.atlan.com",
            "auth": { "type": "api_token", "token": "abc" },
            "page_size": 100,
            "rate_limit": { "max_requests": 10, "period": 1, "burst_size": 2 }
        }))
        .unwrap();

        assert_eq!(config.client.name, "prod");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.tag_cache_ttl_secs, 600);
        assert_eq!(config.rate_limit.unwrap().period, Duration::from_secs(1));
    }

    #[test]
    fn test_connector_identity() {
        let connector =
            AtlanConnector::new(AtlanConfig::new("https://tenant.atlan.com", "token")).unwrap();
        assert_eq!(connector.name(), "atlan");
        assert_eq!(connector.connector_type(), "atlan");
        assert!(connector.capabilities().contains(&"search".to_string()));
        assert!(atlan_observability::metrics::metrics_registered());
    }

    #[test]
    fn test_guid_params_repeat_key() {
        let params = guid_params(&["a".to_string(), "b".to_string()]);
        assert_eq!(params, vec![("guid", "a".to_string()), ("guid", "b".to_string())]);
    }
}
