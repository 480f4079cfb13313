#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bi_assistant::BiAssistant;
use bi_assistant::sqlite::{ConnectionManager, ensure_performance_schema};
use rusqlite::{Connection, params};

#[derive(Debug, Clone, Copy)]
pub struct CampaignFixture {
    pub product: &'static str,
    pub category: &'static str,
    pub month: u32,
    pub year: i64,
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: i64,
    pub revenue: f64,
    pub allocated_budget: f64,
    pub actual_spend: f64,
}

pub fn campaign(product: &'static str, month: u32, year: i64) -> CampaignFixture {
    CampaignFixture {
        product,
        category: "Electronics",
        month,
        year,
        impressions: 10_000,
        clicks: 400,
        conversions: 20,
        revenue: 1_000.0,
        allocated_budget: 600.0,
        actual_spend: 500.0,
    }
}

pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}-{nanos}"))
}

/// Inserts a product (if new) and one campaign month with its metrics and
/// budget rows. Returns the campaign month id.
pub fn insert_campaign(connection: &Connection, fixture: &CampaignFixture) -> i64 {
    let campaign_month_id = insert_campaign_month(connection, fixture);
    connection
        .execute(
            "INSERT INTO marketing_metrics (campaign_month_id, impressions, clicks, conversions, revenue)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                campaign_month_id,
                fixture.impressions,
                fixture.clicks,
                fixture.conversions,
                fixture.revenue
            ],
        )
        .expect("metrics row should insert");
    connection
        .execute(
            "INSERT INTO budgets (campaign_month_id, allocated_budget, actual_spend)
             VALUES (?1, ?2, ?3)",
            params![
                campaign_month_id,
                fixture.allocated_budget,
                fixture.actual_spend
            ],
        )
        .expect("budget row should insert");
    campaign_month_id
}

/// Inserts only the product and campaign month, leaving out the sibling rows.
pub fn insert_campaign_month(connection: &Connection, fixture: &CampaignFixture) -> i64 {
    connection
        .execute(
            "INSERT OR IGNORE INTO products (name, category, launch_date) VALUES (?1, ?2, '2024-01-15')",
            params![fixture.product, fixture.category],
        )
        .expect("product should insert");
    connection
        .execute(
            "INSERT INTO campaign_months (product_id, month_number, year, campaign_name, status)
             SELECT id, ?2, ?3, ?1 || ' Campaign ' || ?2 || '/' || ?3, 'active'
             FROM products WHERE name = ?1",
            params![fixture.product, fixture.month, fixture.year],
        )
        .expect("campaign month should insert");
    connection.last_insert_rowid()
}

pub fn provision(connection: &Connection, fixtures: &[CampaignFixture]) {
    ensure_performance_schema(connection).expect("schema should apply");
    for fixture in fixtures {
        insert_campaign(connection, fixture);
    }
}

/// A service over a private in-memory database holding `fixtures`.
pub fn provisioned_service(fixtures: &[CampaignFixture]) -> BiAssistant {
    let manager = Arc::new(ConnectionManager::new(":memory:"));
    {
        let connection = manager.acquire().expect("in-memory open should succeed");
        provision(&connection, fixtures);
    }
    BiAssistant::with_connections(manager, 2024)
}
