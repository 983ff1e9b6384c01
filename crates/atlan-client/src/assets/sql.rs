//! Relational assets: databases, schemas, tables, views and columns.

use super::{child_of, set_ancestor, AssetKind, Parent};
use crate::model::{attr, qualified_name, Asset};
use crate::traits::{AtlanError, AtlanResult};

const DATABASE_NAME: &str = "databaseName";
const DATABASE_QUALIFIED_NAME: &str = "databaseQualifiedName";
const SCHEMA_NAME: &str = "schemaName";
const SCHEMA_QUALIFIED_NAME: &str = "schemaQualifiedName";
const TABLE_NAME: &str = "tableName";
const TABLE_QUALIFIED_NAME: &str = "tableQualifiedName";
const VIEW_NAME: &str = "viewName";
const VIEW_QUALIFIED_NAME: &str = "viewQualifiedName";

asset_type!(
    /// A database in a relational source.
    Database,
    "Database",
    ["SQL", "Catalog", "Asset", "Referenceable"]
);

asset_type!(
    /// A schema within a database.
    Schema,
    "Schema",
    ["SQL", "Catalog", "Asset", "Referenceable"]
);

asset_type!(
    /// A table within a schema.
    Table,
    "Table",
    ["SQL", "Catalog", "Asset", "Referenceable"]
);

asset_type!(
    /// A view within a schema.
    View,
    "View",
    ["SQL", "Catalog", "Asset", "Referenceable"]
);

asset_type!(
    /// A column of a table or view.
    Column,
    "Column",
    ["SQL", "Catalog", "Asset", "Referenceable"]
);

impl Database {
    pub fn creator(name: &str, connection_qualified_name: &str) -> AtlanResult<Self> {
        child_of(
            Self::TYPE_NAME,
            name,
            Parent {
                type_name: "Connection",
                relationship: None,
                name_attr: None,
                qualified_name_attr: attr::CONNECTION_QUALIFIED_NAME,
                depth: qualified_name::CONNECTION_DEPTH,
                qualified_name: connection_qualified_name,
            },
        )
        .map(Self)
    }

    pub fn schema_count(&self) -> Option<i64> {
        self.i64_attribute("schemaCount")
    }
}

impl Schema {
    pub fn creator(name: &str, database_qualified_name: &str) -> AtlanResult<Self> {
        child_of(
            Self::TYPE_NAME,
            name,
            Parent {
                type_name: Database::TYPE_NAME,
                relationship: Some("database"),
                name_attr: Some(DATABASE_NAME),
                qualified_name_attr: DATABASE_QUALIFIED_NAME,
                depth: qualified_name::CONNECTION_DEPTH + 1,
                qualified_name: database_qualified_name,
            },
        )
        .map(Self)
    }

    pub fn database_qualified_name(&self) -> Option<&str> {
        self.str_attribute(DATABASE_QUALIFIED_NAME)
    }

    pub fn table_count(&self) -> Option<i64> {
        self.i64_attribute("tableCount")
    }

    pub fn views_count(&self) -> Option<i64> {
        self.i64_attribute("viewsCount")
    }
}

/// Tables and views share their placement beneath a schema.
fn in_schema(type_name: &str, name: &str, schema_qualified_name: &str) -> AtlanResult<Asset> {
    let mut asset = child_of(
        type_name,
        name,
        Parent {
            type_name: Schema::TYPE_NAME,
            relationship: Some("atlanSchema"),
            name_attr: Some(SCHEMA_NAME),
            qualified_name_attr: SCHEMA_QUALIFIED_NAME,
            depth: qualified_name::CONNECTION_DEPTH + 2,
            qualified_name: schema_qualified_name,
        },
    )?;
    if let Some(database) = qualified_name::parent_of(schema_qualified_name) {
        set_ancestor(&mut asset, DATABASE_NAME, DATABASE_QUALIFIED_NAME, database);
    }
    Ok(asset)
}

impl Table {
    pub fn creator(name: &str, schema_qualified_name: &str) -> AtlanResult<Self> {
        in_schema(Self::TYPE_NAME, name, schema_qualified_name).map(Self)
    }

    pub fn with_row_count(self, rows: i64) -> Self {
        self.with_attribute("rowCount", rows)
    }

    pub fn schema_qualified_name(&self) -> Option<&str> {
        self.str_attribute(SCHEMA_QUALIFIED_NAME)
    }

    pub fn database_qualified_name(&self) -> Option<&str> {
        self.str_attribute(DATABASE_QUALIFIED_NAME)
    }

    pub fn row_count(&self) -> Option<i64> {
        self.i64_attribute("rowCount")
    }

    pub fn column_count(&self) -> Option<i64> {
        self.i64_attribute("columnCount")
    }
}

impl View {
    pub fn creator(name: &str, schema_qualified_name: &str) -> AtlanResult<Self> {
        in_schema(Self::TYPE_NAME, name, schema_qualified_name).map(Self)
    }

    pub fn with_definition(self, sql: &str) -> Self {
        self.with_attribute("definition", sql)
    }

    pub fn schema_qualified_name(&self) -> Option<&str> {
        self.str_attribute(SCHEMA_QUALIFIED_NAME)
    }

    pub fn definition(&self) -> Option<&str> {
        self.str_attribute("definition")
    }

    pub fn column_count(&self) -> Option<i64> {
        self.i64_attribute("columnCount")
    }
}

impl Column {
    /// A column of the table or view at `parent_qualified_name`.
    ///
    /// `parent_type` must be `"Table"` or `"View"`; `order` is the column's
    /// 1-based position.
    pub fn creator(
        name: &str,
        parent_type: &str,
        parent_qualified_name: &str,
        order: i32,
    ) -> AtlanResult<Self> {
        let (parent_type, relationship, name_attr, qn_attr) = match parent_type {
            "Table" => (Table::TYPE_NAME, "table", TABLE_NAME, TABLE_QUALIFIED_NAME),
            "View" => (View::TYPE_NAME, "view", VIEW_NAME, VIEW_QUALIFIED_NAME),
            other => {
                return Err(AtlanError::InvalidRequest(format!(
                    "A Column's parent must be a Table or View, not {}",
                    other
                )))
            }
        };

        let mut asset = child_of(
            Self::TYPE_NAME,
            name,
            Parent {
                type_name: parent_type,
                relationship: Some(relationship),
                name_attr: Some(name_attr),
                qualified_name_attr: qn_attr,
                depth: qualified_name::CONNECTION_DEPTH + 3,
                qualified_name: parent_qualified_name,
            },
        )?;
        asset.set_attribute("order", order);

        if let Some(schema) = qualified_name::parent_of(parent_qualified_name) {
            set_ancestor(&mut asset, SCHEMA_NAME, SCHEMA_QUALIFIED_NAME, schema);
            if let Some(database) = qualified_name::parent_of(schema) {
                set_ancestor(&mut asset, DATABASE_NAME, DATABASE_QUALIFIED_NAME, database);
            }
        }
        Ok(Self(asset))
    }

    pub fn with_data_type(self, data_type: &str) -> Self {
        self.with_attribute("dataType", data_type)
    }

    pub fn with_nullable(self, nullable: bool) -> Self {
        self.with_attribute("isNullable", nullable)
    }

    pub fn order(&self) -> Option<i64> {
        self.i64_attribute("order")
    }

    pub fn data_type(&self) -> Option<&str> {
        self.str_attribute("dataType")
    }

    pub fn is_nullable(&self) -> Option<bool> {
        self.bool_attribute("isNullable")
    }

    /// Qualified name of the containing table or view.
    pub fn parent_qualified_name(&self) -> Option<&str> {
        self.str_attribute(TABLE_QUALIFIED_NAME)
            .or_else(|| self.str_attribute(VIEW_QUALIFIED_NAME))
    }
}
