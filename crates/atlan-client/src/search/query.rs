//! Index-search queries and the fields they are built from.
//!
//! Queries serialise to the Elasticsearch query DSL accepted by the
//! `indexsearch` endpoint.

use serde::ser::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// A query clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll,
    Term { field: String, value: Value },
    Terms { field: String, values: Vec<Value> },
    Prefix { field: String, value: String },
    Exists { field: String },
    Range {
        field: String,
        gt: Option<Value>,
        gte: Option<Value>,
        lt: Option<Value>,
        lte: Option<Value>,
    },
    /// Full-text match on an analysed field.
    Match { field: String, value: String },
    Bool(BoolQuery),
}

/// A compound query. `filter` and `must` clauses must all match; at least
/// `minimum_should_match` of the `should` clauses must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub filter: Vec<Query>,
    pub must: Vec<Query>,
    pub must_not: Vec<Query>,
    pub should: Vec<Query>,
    pub minimum_should_match: Option<u32>,
}

impl Query {
    pub fn to_json(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::Term { field, value } => json!({ "term": { field.as_str(): { "value": value } } }),
            Query::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
            Query::Prefix { field, value } => {
                json!({ "prefix": { field.as_str(): { "value": value } } })
            }
            Query::Exists { field } => json!({ "exists": { "field": field } }),
            Query::Range {
                field,
                gt,
                gte,
                lt,
                lte,
            } => {
                let mut bounds = Map::new();
                for (key, bound) in [("gt", gt), ("gte", gte), ("lt", lt), ("lte", lte)] {
                    if let Some(v) = bound {
                        bounds.insert(key.to_string(), v.clone());
                    }
                }
                json!({ "range": { field.as_str(): bounds } })
            }
            Query::Match { field, value } => {
                json!({ "match": { field.as_str(): { "query": value } } })
            }
            Query::Bool(b) => {
                let mut body = Map::new();
                for (key, clauses) in [
                    ("filter", &b.filter),
                    ("must", &b.must),
                    ("must_not", &b.must_not),
                    ("should", &b.should),
                ] {
                    if !clauses.is_empty() {
                        body.insert(
                            key.to_string(),
                            Value::Array(clauses.iter().map(Query::to_json).collect()),
                        );
                    }
                }
                if let Some(min) = b.minimum_should_match {
                    body.insert("minimum_should_match".to_string(), json!(min));
                }
                json!({ "bool": body })
            }
        }
    }

    /// All of `queries`, as filter context.
    pub fn all(queries: Vec<Query>) -> Query {
        Query::Bool(BoolQuery {
            filter: queries,
            ..BoolQuery::default()
        })
    }

    /// At least one of `queries`.
    pub fn any(queries: Vec<Query>) -> Query {
        Query::Bool(BoolQuery {
            should: queries,
            minimum_should_match: Some(1),
            ..BoolQuery::default()
        })
    }

    pub fn not(query: Query) -> Query {
        Query::Bool(BoolQuery {
            must_not: vec![query],
            ..BoolQuery::default()
        })
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortItem {
    pub field: String,
    pub order: SortOrder,
}

impl Serialize for SortItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        json!({ self.field.as_str(): { "order": self.order.as_str() } }).serialize(serializer)
    }
}

/// An exact-match field (keyword-analysed in the index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordField {
    pub name: &'static str,
}

impl KeywordField {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn eq(&self, value: impl Into<String>) -> Query {
        Query::Term {
            field: self.name.to_string(),
            value: Value::String(value.into()),
        }
    }

    pub fn within<I, S>(&self, values: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::Terms {
            field: self.name.to_string(),
            values: values.into_iter().map(|v| Value::String(v.into())).collect(),
        }
    }

    pub fn starts_with(&self, prefix: impl Into<String>) -> Query {
        Query::Prefix {
            field: self.name.to_string(),
            value: prefix.into(),
        }
    }

    pub fn has_any_value(&self) -> Query {
        Query::Exists {
            field: self.name.to_string(),
        }
    }

    pub fn order(&self, order: SortOrder) -> SortItem {
        SortItem {
            field: self.name.to_string(),
            order,
        }
    }
}

/// A numeric or date (epoch millis) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericField {
    pub name: &'static str,
}

impl NumericField {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    fn bounded(&self, gt: Option<i64>, gte: Option<i64>, lt: Option<i64>, lte: Option<i64>) -> Query {
        Query::Range {
            field: self.name.to_string(),
            gt: gt.map(Value::from),
            gte: gte.map(Value::from),
            lt: lt.map(Value::from),
            lte: lte.map(Value::from),
        }
    }

    pub fn eq(&self, value: i64) -> Query {
        Query::Term {
            field: self.name.to_string(),
            value: json!(value),
        }
    }

    pub fn gt(&self, value: i64) -> Query {
        self.bounded(Some(value), None, None, None)
    }

    pub fn gte(&self, value: i64) -> Query {
        self.bounded(None, Some(value), None, None)
    }

    pub fn lt(&self, value: i64) -> Query {
        self.bounded(None, None, Some(value), None)
    }

    pub fn lte(&self, value: i64) -> Query {
        self.bounded(None, None, None, Some(value))
    }

    /// Inclusive on both ends.
    pub fn between(&self, min: i64, max: i64) -> Query {
        self.bounded(None, Some(min), None, Some(max))
    }

    pub fn order(&self, order: SortOrder) -> SortItem {
        SortItem {
            field: self.name.to_string(),
            order,
        }
    }
}

/// A full-text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextField {
    pub name: &'static str,
}

impl TextField {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn matches(&self, text: impl Into<String>) -> Query {
        Query::Match {
            field: self.name.to_string(),
            value: text.into(),
        }
    }
}

/// Fields present on every asset in the search index.
pub mod fields {
    use super::{KeywordField, NumericField, TextField};

    pub const TYPE_NAME: KeywordField = KeywordField::new("__typeName.keyword");
    pub const SUPER_TYPE_NAMES: KeywordField = KeywordField::new("__superTypeNames.keyword");
    pub const GUID: KeywordField = KeywordField::new("__guid");
    pub const STATUS: KeywordField = KeywordField::new("__state");
    pub const QUALIFIED_NAME: KeywordField = KeywordField::new("qualifiedName");
    pub const NAME: KeywordField = KeywordField::new("name.keyword");
    pub const NAME_TEXT: TextField = TextField::new("name");
    pub const DESCRIPTION: TextField = TextField::new("description");
    /// Internal tag identifiers, direct and propagated.
    pub const ATLAN_TAGS: KeywordField = KeywordField::new("__traitNames");
    pub const PROPAGATED_ATLAN_TAGS: KeywordField = KeywordField::new("__propagatedTraitNames");
    /// Qualified names of assigned glossary terms.
    pub const ASSIGNED_TERMS: KeywordField = KeywordField::new("__meanings");
    pub const CONNECTION_QUALIFIED_NAME: KeywordField =
        KeywordField::new("connectionQualifiedName");
    pub const CONNECTOR_NAME: KeywordField = KeywordField::new("connectorName");
    pub const CERTIFICATE_STATUS: KeywordField = KeywordField::new("certificateStatus");
    pub const OWNER_USERS: KeywordField = KeywordField::new("ownerUsers");
    pub const OWNER_GROUPS: KeywordField = KeywordField::new("ownerGroups");
    pub const CREATE_TIME: NumericField = NumericField::new("__timestamp");
    pub const UPDATE_TIME: NumericField = NumericField::new("__modificationTimestamp");
}
