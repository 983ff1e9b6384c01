//! Index-search request and response bodies.

use super::query::{Query, SortItem};
use crate::model::Asset;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;

/// An aggregation over the matching assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
    /// Bucket counts per distinct value of a keyword field.
    Terms { field: String, size: usize },
}

impl Serialize for Aggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Aggregation::Terms { field, size } => {
                json!({ "terms": { "field": field, "size": size } }).serialize(serializer)
            }
        }
    }
}

/// The query part of a search request.
#[derive(Debug, Clone, PartialEq)]
pub struct Dsl {
    pub from: usize,
    pub size: usize,
    pub query: Query,
    pub sort: Vec<SortItem>,
    pub aggregations: BTreeMap<String, Aggregation>,
    /// Ask for an exact total rather than the default capped estimate.
    pub track_total_hits: bool,
}

impl Serialize for Dsl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("from", &self.from)?;
        map.serialize_entry("size", &self.size)?;
        map.serialize_entry("query", &self.query)?;
        if !self.sort.is_empty() {
            map.serialize_entry("sort", &self.sort)?;
        }
        if !self.aggregations.is_empty() {
            map.serialize_entry("aggregations", &self.aggregations)?;
        }
        map.serialize_entry("track_total_hits", &self.track_total_hits)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSearchRequest {
    pub dsl: Dsl,
    /// Attributes to include on each result.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    /// Attributes to include on each related asset in the results.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relation_attributes: Vec<String>,
    pub suppress_logs: bool,
    pub show_search_score: bool,
}

impl IndexSearchRequest {
    pub fn new(query: Query, from: usize, size: usize) -> Self {
        Self {
            dsl: Dsl {
                from,
                size,
                query,
                sort: Vec::new(),
                aggregations: BTreeMap::new(),
                track_total_hits: true,
            },
            attributes: Vec::new(),
            relation_attributes: Vec::new(),
            suppress_logs: true,
            show_search_score: false,
        }
    }

    /// The same request positioned at another offset.
    pub fn with_offset(&self, from: usize) -> Self {
        let mut next = self.clone();
        next.dsl.from = from;
        next
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationBucket {
    pub key: String,
    pub doc_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct AggregationResult {
    #[serde(default)]
    pub buckets: Vec<AggregationBucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSearchResponse {
    #[serde(default)]
    pub approximate_count: u64,
    /// Absent from the wire when nothing matched.
    #[serde(default)]
    pub entities: Vec<Asset>,
    #[serde(default)]
    pub aggregations: BTreeMap<String, AggregationResult>,
}

impl IndexSearchResponse {
    pub fn buckets(&self, name: &str) -> &[AggregationBucket] {
        self.aggregations
            .get(name)
            .map(|a| a.buckets.as_slice())
            .unwrap_or(&[])
    }
}
