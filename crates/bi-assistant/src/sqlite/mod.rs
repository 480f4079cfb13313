pub mod connection;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Params, Statement};
use serde_json::{Value, json};

use crate::models::Row;

pub use connection::{ConnectionHandle, ConnectionManager};

pub const PRODUCTS_TABLE: &str = "products";
pub const CAMPAIGN_MONTHS_TABLE: &str = "campaign_months";
pub const MARKETING_METRICS_TABLE: &str = "marketing_metrics";
pub const BUDGETS_TABLE: &str = "budgets";
pub const PERFORMANCE_VIEW: &str = "campaign_performance";
pub const INTERNAL_OBJECT_PREFIX: &str = "sqlite_";

const CREATE_PRODUCTS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    category TEXT,
    launch_date DATE,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

const CREATE_CAMPAIGN_MONTHS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS campaign_months (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER,
    month_number INTEGER NOT NULL,
    year INTEGER NOT NULL,
    campaign_name TEXT,
    start_date DATE,
    end_date DATE,
    status TEXT DEFAULT 'active' CHECK (status IN ('active', 'paused', 'completed')),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (product_id, month_number, year),
    FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE
);
"#;

const CREATE_MARKETING_METRICS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS marketing_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    campaign_month_id INTEGER,
    impressions INTEGER DEFAULT 0 CHECK (impressions >= 0),
    clicks INTEGER DEFAULT 0 CHECK (clicks >= 0),
    conversions INTEGER DEFAULT 0 CHECK (conversions >= 0),
    revenue REAL DEFAULT 0.00 CHECK (revenue >= 0),
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (campaign_month_id) REFERENCES campaign_months(id) ON DELETE CASCADE
);
"#;

const CREATE_BUDGETS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS budgets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    campaign_month_id INTEGER,
    allocated_budget REAL NOT NULL,
    actual_spend REAL DEFAULT 0.00,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (campaign_month_id) REFERENCES campaign_months(id) ON DELETE CASCADE
);
"#;

// Inner joins: a campaign month without both a metrics row and a budget row
// does not appear. Every ratio is guarded so a zero denominator yields 0.
const CREATE_PERFORMANCE_VIEW_SQL: &str = r#"
CREATE VIEW IF NOT EXISTS campaign_performance AS
SELECT
    p.name AS product_name,
    p.category,
    cm.month_number,
    cm.year,
    cm.campaign_name,
    mm.impressions,
    mm.clicks,
    mm.conversions,
    mm.revenue,
    b.allocated_budget,
    b.actual_spend,
    ROUND(CASE
        WHEN mm.impressions > 0
        THEN (CAST(mm.clicks AS REAL) / mm.impressions) * 100 ELSE 0 END, 2) AS ctr_percentage,
    ROUND(CASE
        WHEN b.actual_spend > 0
        THEN CAST(mm.revenue AS REAL) / b.actual_spend ELSE 0 END, 2) AS roas,
    ROUND(CASE
        WHEN b.actual_spend > 0
        THEN (CAST(mm.revenue AS REAL) - b.actual_spend) / b.actual_spend ELSE 0 END, 2) AS roi,
    ROUND(CASE
        WHEN mm.conversions > 0 AND b.actual_spend > 0
        THEN CAST(b.actual_spend AS REAL) / mm.conversions ELSE 0 END, 2) AS cpa,
    ROUND(CASE
        WHEN mm.clicks > 0 AND b.actual_spend > 0
        THEN CAST(b.actual_spend AS REAL) / mm.clicks ELSE 0 END, 2) AS cpc,
    ROUND(CASE
        WHEN mm.impressions > 0 AND b.actual_spend > 0
        THEN (CAST(b.actual_spend AS REAL) / mm.impressions) * 1000 ELSE 0 END, 2) AS cpm
FROM products p
JOIN campaign_months cm ON p.id = cm.product_id
JOIN marketing_metrics mm ON cm.id = mm.campaign_month_id
JOIN budgets b ON cm.id = b.campaign_month_id
ORDER BY p.name, cm.year, cm.month_number;
"#;

#[must_use]
pub fn schema_statements() -> &'static [&'static str] {
    &[
        CREATE_PRODUCTS_TABLE_SQL,
        CREATE_CAMPAIGN_MONTHS_TABLE_SQL,
        CREATE_MARKETING_METRICS_TABLE_SQL,
        CREATE_BUDGETS_TABLE_SQL,
        CREATE_PERFORMANCE_VIEW_SQL,
    ]
}

#[must_use]
pub fn create_schema_sql() -> String {
    schema_statements().join("\n")
}

/// Creates the base tables and the performance view when absent. Existing
/// objects and their rows are left alone.
pub fn ensure_performance_schema(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch(&create_schema_sql())
}

#[must_use]
pub fn is_internal_object(name: &str) -> bool {
    name.starts_with(INTERNAL_OBJECT_PREFIX)
}

/// Double-quotes an identifier taken from the catalog so it can be placed in
/// statement text.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Runs a prepared statement to completion, turning each row into a
/// column-name keyed map.
pub fn collect_rows<P: Params>(statement: &mut Statement<'_>, params: P) -> rusqlite::Result<Vec<Row>> {
    let column_names = statement
        .column_names()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    let mut rows = statement.query(params)?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Row::new();
        for (index, column_name) in column_names.iter().enumerate() {
            let value = row.get::<usize, SqlValue>(index)?;
            record.insert(column_name.clone(), json_value_from_sql(value));
        }
        records.push(record);
    }

    Ok(records)
}

#[must_use]
pub fn json_value_from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(value) => json!(value),
        SqlValue::Real(value) => json!(value),
        SqlValue::Text(value) => json!(value),
        SqlValue::Blob(value) => json!(encode_blob_hex(&value)),
    }
}

fn encode_blob_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut output = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        output.push(HEX[(byte >> 4) as usize] as char);
        output.push(HEX[(byte & 0x0f) as usize] as char);
    }
    output
}
