//! Fluent builder for index searches.

use super::query::{fields, BoolQuery, Query, SortItem, SortOrder};
use super::request::{Aggregation, IndexSearchRequest, IndexSearchResponse};
use crate::assets::AssetKind;
use crate::model::{Asset, EntityStatus};
use crate::traits::{AtlanResult, CatalogConnector};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on pages fetched by [`FluentSearch::all`].
const MAX_PAGES: usize = 10_000;

/// Collects filter criteria and result options, then builds or runs the
/// resulting index search.
///
/// ```no_run
/// # use atlan_client::assets::View;
/// # use atlan_client::search::fields;
/// # async fn run(client: &dyn atlan_client::CatalogConnector) -> atlan_client::AtlanResult<()> {
/// let views = View::select(false)
///     .filter(fields::QUALIFIED_NAME.starts_with("default/snowflake/1700000000/"))
///     .page_size(50)
///     .all(client)
///     .await?;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FluentSearch {
    wheres: Vec<Query>,
    where_nots: Vec<Query>,
    where_somes: Vec<Query>,
    min_somes: u32,
    page_size: usize,
    attributes: Vec<String>,
    relation_attributes: Vec<String>,
    sorts: Vec<SortItem>,
    aggregations: BTreeMap<String, Aggregation>,
}

impl Default for FluentSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl FluentSearch {
    pub fn new() -> Self {
        Self {
            wheres: Vec::new(),
            where_nots: Vec::new(),
            where_somes: Vec::new(),
            min_somes: 1,
            page_size: DEFAULT_PAGE_SIZE,
            attributes: Vec::new(),
            relation_attributes: Vec::new(),
            sorts: Vec::new(),
            aggregations: BTreeMap::new(),
        }
    }

    /// Results must match `query`.
    pub fn filter(mut self, query: Query) -> Self {
        self.wheres.push(query);
        self
    }

    /// Results must not match `query`.
    pub fn filter_not(mut self, query: Query) -> Self {
        self.where_nots.push(query);
        self
    }

    /// Results should match `query`; see [`FluentSearch::min_somes`].
    pub fn filter_some(mut self, query: Query) -> Self {
        self.where_somes.push(query);
        self
    }

    pub fn min_somes(mut self, minimum: u32) -> Self {
        self.min_somes = minimum;
        self
    }

    /// Only active (non-archived) assets.
    pub fn active(self) -> Self {
        self.filter(fields::STATUS.eq(EntityStatus::Active.as_str()))
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    pub fn include_on_results(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn include_on_relations(mut self, attribute: impl Into<String>) -> Self {
        self.relation_attributes.push(attribute.into());
        self
    }

    pub fn sort(mut self, item: SortItem) -> Self {
        self.sorts.push(item);
        self
    }

    pub fn aggregate(mut self, name: impl Into<String>, aggregation: Aggregation) -> Self {
        self.aggregations.insert(name.into(), aggregation);
        self
    }

    /// The combined query.
    pub fn to_query(&self) -> Query {
        let should_min = if self.where_somes.is_empty() {
            None
        } else {
            Some(self.min_somes)
        };
        Query::Bool(BoolQuery {
            filter: self.wheres.clone(),
            must: Vec::new(),
            must_not: self.where_nots.clone(),
            should: self.where_somes.clone(),
            minimum_should_match: should_min,
        })
    }

    /// The request for the first page. A GUID sort is appended so offset
    /// paging is stable.
    pub fn to_request(&self) -> IndexSearchRequest {
        let mut request = IndexSearchRequest::new(self.to_query(), 0, self.page_size);
        request.dsl.sort = self.sorts.clone();
        if !request.dsl.sort.iter().any(|s| s.field == fields::GUID.name) {
            request.dsl.sort.push(fields::GUID.order(SortOrder::Asc));
        }
        request.dsl.aggregations = self.aggregations.clone();
        request.attributes = self.attributes.clone();
        request.relation_attributes = self.relation_attributes.clone();
        request
    }

    /// Runs the search and returns the first page.
    #[instrument(skip_all)]
    pub async fn execute(&self, client: &dyn CatalogConnector) -> AtlanResult<IndexSearchResponse> {
        client.search(&self.to_request()).await
    }

    /// Number of matching assets.
    pub async fn count(&self, client: &dyn CatalogConnector) -> AtlanResult<u64> {
        let mut request = self.to_request();
        request.dsl.size = 1;
        request.dsl.aggregations.clear();
        Ok(client.search(&request).await?.approximate_count)
    }

    pub async fn first(&self, client: &dyn CatalogConnector) -> AtlanResult<Option<Asset>> {
        let mut request = self.to_request();
        request.dsl.size = 1;
        Ok(client.search(&request).await?.entities.into_iter().next())
    }

    /// Every matching asset, paging by offset until a short page.
    #[instrument(skip_all, fields(page_size = self.page_size))]
    pub async fn all(&self, client: &dyn CatalogConnector) -> AtlanResult<Vec<Asset>> {
        let first = self.to_request();
        let mut results = Vec::new();

        for page in 0..MAX_PAGES {
            let request = first.with_offset(page * self.page_size);
            let response = client.search(&request).await?;
            let received = response.entities.len();
            results.extend(response.entities);
            debug!(page, received, total = response.approximate_count, "Fetched search page");

            if received < self.page_size || results.len() as u64 >= response.approximate_count {
                return Ok(results);
            }
        }

        warn!(pages = MAX_PAGES, "Search paging stopped at the page limit");
        Ok(results)
    }

    /// Every matching asset of type `T`; assets of other types are skipped.
    pub async fn all_of<T: AssetKind>(&self, client: &dyn CatalogConnector) -> AtlanResult<Vec<T>> {
        Ok(self
            .all(client)
            .await?
            .into_iter()
            .filter_map(|asset| T::try_from_asset(asset).ok())
            .collect())
    }
}

/// A query matching assets carrying any of the named tags, directly or
/// through propagation. Names are translated by the connector.
pub async fn tagged(client: &dyn CatalogConnector, names: &[&str]) -> AtlanResult<Query> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(client.atlan_tag_id(name).await?);
    }
    Ok(Query::any(vec![
        fields::ATLAN_TAGS.within(ids.clone()),
        fields::PROPAGATED_ATLAN_TAGS.within(ids),
    ]))
}
