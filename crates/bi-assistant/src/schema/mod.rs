pub mod registry;

use std::collections::BTreeMap;
use std::sync::Arc;

use rusqlite::Connection;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::models::{BiError, Row};
use crate::sqlite::{ConnectionManager, collect_rows, is_internal_object, quote_identifier};

pub use registry::{KeyMetricDoc, ViewDoc, key_metric_docs, view_docs};

pub const SAMPLE_ROW_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    pub nullable: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDescription {
    #[serde(skip)]
    pub name: String,
    pub columns: Vec<ColumnDescription>,
    pub sample_data: Option<Vec<Row>>,
}

/// Serialized as `{tables: {name: {...}}, views: {...}, key_metrics: {...}}`
/// with tables kept in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDescription {
    #[serde(serialize_with = "serialize_tables")]
    pub tables: Vec<TableDescription>,
    pub views: BTreeMap<&'static str, &'static str>,
    pub key_metrics: BTreeMap<&'static str, &'static str>,
}

impl SchemaDescription {
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableDescription> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|table| table.name.as_str())
    }
}

fn serialize_tables<S: Serializer>(
    tables: &[TableDescription],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(tables.iter().map(|table| (&table.name, table)))
}

#[derive(Debug, Clone)]
pub struct SchemaIntrospector {
    connections: Arc<ConnectionManager>,
}

impl SchemaIntrospector {
    #[must_use]
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    pub fn describe(&self) -> Result<SchemaDescription, BiError> {
        let connection = self.connections.acquire()?;
        let tables = list_user_tables(&connection)?
            .into_iter()
            .map(|name| describe_table(&connection, name))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(table_count = tables.len(), "schema described");

        Ok(SchemaDescription {
            tables,
            views: view_docs()
                .iter()
                .map(|doc| (doc.name, doc.description))
                .collect(),
            key_metrics: key_metric_docs()
                .iter()
                .map(|doc| (doc.name, doc.formula))
                .collect(),
        })
    }
}

/// Table names from the catalog in catalog order, minus SQLite's own tables.
pub fn list_user_tables(connection: &Connection) -> Result<Vec<String>, BiError> {
    let mut statement = connection
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
        .map_err(BiError::query("failed to prepare table enumeration"))?;
    let names = statement
        .query_map([], |row| row.get::<usize, String>(0))
        .map_err(BiError::query("failed to enumerate tables"))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(BiError::query("failed to decode table name"))?;

    Ok(names
        .into_iter()
        .filter(|name| !is_internal_object(name))
        .collect())
}

fn describe_table(connection: &Connection, name: String) -> Result<TableDescription, BiError> {
    let columns = load_columns(connection, &name)?;
    let sample_data = match load_sample_rows(connection, &name) {
        Ok(rows) => Some(rows),
        Err(sample_error) => {
            warn!(table = %name, error = %sample_error, "could not fetch sample data");
            None
        }
    };

    Ok(TableDescription {
        name,
        columns,
        sample_data,
    })
}

fn load_columns(connection: &Connection, table: &str) -> Result<Vec<ColumnDescription>, BiError> {
    let pragma_sql = format!("PRAGMA table_info({})", quote_identifier(table));
    let mut statement = connection
        .prepare(&pragma_sql)
        .map_err(BiError::query(format!(
            "failed to prepare column introspection for `{table}`"
        )))?;
    let columns = statement
        .query_map([], |row| {
            Ok(ColumnDescription {
                name: row.get::<usize, String>(1)?,
                declared_type: row.get::<usize, Option<String>>(2)?.unwrap_or_default(),
                nullable: row.get::<usize, i64>(3)? == 0,
                default: row.get::<usize, Option<String>>(4)?,
            })
        })
        .map_err(BiError::query(format!(
            "failed to execute column introspection for `{table}`"
        )))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(BiError::query(format!("failed to decode columns of `{table}`")))?;

    Ok(columns)
}

fn load_sample_rows(connection: &Connection, table: &str) -> rusqlite::Result<Vec<Row>> {
    let sample_sql = format!(
        "SELECT * FROM {} LIMIT {SAMPLE_ROW_LIMIT}",
        quote_identifier(table)
    );
    let mut statement = connection.prepare(&sample_sql)?;
    collect_rows(&mut statement, [])
}
