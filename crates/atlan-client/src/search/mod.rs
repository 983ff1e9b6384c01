//! Index search: fields, queries, the fluent builder and wire bodies.

pub mod fluent;
pub mod query;
pub mod request;

pub use fluent::{tagged, FluentSearch, DEFAULT_PAGE_SIZE};
pub use query::{fields, BoolQuery, KeywordField, NumericField, Query, SortItem, SortOrder, TextField};
pub use request::{
    Aggregation, AggregationBucket, AggregationResult, Dsl, IndexSearchRequest, IndexSearchResponse,
};
