use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use rusqlite::params_from_iter;
use rusqlite::types::Value as SqlValue;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::DEFAULT_YEAR;
use crate::models::{BiError, QueryRows, Row, ValidationError};
use crate::query::execute_read_only;
use crate::sqlite::{ConnectionManager, PERFORMANCE_VIEW};

/// Columns returned by a single-metric lookup ahead of the metric itself.
pub const LOOKUP_BASE_COLUMNS: &[&str] = &[
    "product_name",
    "month_number",
    "year",
    "campaign_name",
    "impressions",
    "clicks",
    "conversions",
    "revenue",
    "actual_spend",
];

/// The KPI columns of the performance view that may be requested by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Roas,
    Roi,
    CtrPercentage,
    Cpa,
    Cpc,
    Cpm,
}

impl Metric {
    pub const ALL: [Self; 6] = [
        Self::Roas,
        Self::Roi,
        Self::CtrPercentage,
        Self::Cpa,
        Self::Cpc,
        Self::Cpm,
    ];

    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Roas => "roas",
            Self::Roi => "roi",
            Self::CtrPercentage => "ctr_percentage",
            Self::Cpa => "cpa",
            Self::Cpc => "cpc",
            Self::Cpm => "cpm",
        }
    }

    #[must_use]
    pub fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(|metric| metric.column())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Metric {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|metric| metric.column() == normalized)
            .ok_or_else(|| ValidationError::InvalidMetric {
                requested: raw.to_string(),
                allowed: Self::allowed_names(),
            })
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceFilter {
    pub product: Option<String>,
    pub month: Option<u32>,
    pub year: i64,
}

impl Default for PerformanceFilter {
    fn default() -> Self {
        Self {
            product: None,
            month: None,
            year: DEFAULT_YEAR,
        }
    }
}

impl PerformanceFilter {
    /// Conjunctive WHERE clause over the view. `year` is always present;
    /// blank products and absent or zero months add no condition.
    fn where_clause(&self) -> (String, Vec<SqlValue>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(product) = self.product.as_deref().filter(|p| !p.trim().is_empty()) {
            conditions.push("LOWER(product_name) = LOWER(?)");
            params.push(SqlValue::Text(product.to_string()));
        }
        if let Some(month) = self.month.filter(|month| *month != 0) {
            conditions.push("month_number = ?");
            params.push(SqlValue::Integer(i64::from(month)));
        }
        conditions.push("year = ?");
        params.push(SqlValue::Integer(self.year));

        (conditions.join(" AND "), params)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRequest {
    pub product: Option<String>,
    pub month: Option<u32>,
    pub metric: Option<String>,
    pub year: i64,
}

impl MetricRequest {
    /// Checks presence of every required field, then the metric name.
    fn validate(&self) -> Result<(&str, u32, Metric), ValidationError> {
        let product = self
            .product
            .as_deref()
            .filter(|product| !product.trim().is_empty())
            .ok_or(ValidationError::MissingParameter("product"))?;
        let month = self
            .month
            .filter(|month| *month != 0)
            .ok_or(ValidationError::MissingParameter("month"))?;
        let metric = self
            .metric
            .as_deref()
            .filter(|metric| !metric.trim().is_empty())
            .ok_or(ValidationError::MissingParameter("metric"))?
            .parse::<Metric>()?;

        Ok((product, month, metric))
    }
}

#[derive(Debug, Clone)]
pub struct MetricResolver {
    connections: Arc<ConnectionManager>,
}

impl MetricResolver {
    #[must_use]
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    /// Every view row matching the filter, ordered by product then month.
    pub fn aggregate(&self, filter: &PerformanceFilter) -> Result<QueryRows, BiError> {
        let (where_clause, params) = filter.where_clause();
        let sql = format!(
            "SELECT * FROM {PERFORMANCE_VIEW} WHERE {where_clause} ORDER BY product_name, month_number"
        );

        let connection = self.connections.acquire()?;
        let rows = execute_read_only(&connection, &sql, params_from_iter(params.iter()))?;
        Ok(QueryRows::new(rows))
    }

    /// The view row for one product-month, projected down to the identifying
    /// and raw columns plus the requested KPI.
    pub fn compute(&self, request: &MetricRequest) -> Result<Row, BiError> {
        let (product, month, metric) = request.validate()?;
        let sql = lookup_sql(metric);

        let connection = self.connections.acquire()?;
        let mut rows = execute_read_only(
            &connection,
            &sql,
            rusqlite::params![product, month, request.year],
        )?;

        if rows.len() > 1 {
            warn!(
                product,
                month,
                year = request.year,
                matches = rows.len(),
                "more than one performance row for a product-month; using the first"
            );
        }
        if rows.is_empty() {
            return Err(BiError::NotFound {
                product: product.to_string(),
                month,
                year: request.year,
            });
        }
        Ok(rows.swap_remove(0))
    }
}

fn lookup_sql(metric: Metric) -> String {
    format!(
        "SELECT {base}, {metric} FROM {PERFORMANCE_VIEW} \
         WHERE LOWER(product_name) = LOWER(?1) AND month_number = ?2 AND year = ?3 \
         LIMIT 2",
        base = LOOKUP_BASE_COLUMNS.join(", "),
        metric = metric.column(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::{Metric, MetricRequest, MetricResolver, PerformanceFilter, lookup_sql};
    use crate::models::{ErrorKind, ValidationError};
    use crate::sqlite::{ConnectionManager, ensure_performance_schema};

    fn resolver_with_rows(rows: &[(&str, u32, i64, f64, f64)]) -> MetricResolver {
        let manager = Arc::new(ConnectionManager::new(":memory:"));
        {
            let connection = manager.acquire().expect("in-memory open should succeed");
            ensure_performance_schema(&connection).expect("schema should apply");
            for (product, month, year, revenue, spend) in rows {
                connection
                    .execute(
                        "INSERT OR IGNORE INTO products (name, category) VALUES (?1, 'Electronics')",
                        rusqlite::params![product],
                    )
                    .expect("product should insert");
                connection
                    .execute(
                        "INSERT INTO campaign_months (product_id, month_number, year, campaign_name)
                         SELECT id, ?2, ?3, ?1 || ' campaign' FROM products WHERE name = ?1",
                        rusqlite::params![product, month, year],
                    )
                    .expect("campaign month should insert");
                let campaign_id = connection.last_insert_rowid();
                connection
                    .execute(
                        "INSERT INTO marketing_metrics (campaign_month_id, impressions, clicks, conversions, revenue)
                         VALUES (?1, 10000, 400, 20, ?2)",
                        rusqlite::params![campaign_id, revenue],
                    )
                    .expect("metrics should insert");
                connection
                    .execute(
                        "INSERT INTO budgets (campaign_month_id, allocated_budget, actual_spend)
                         VALUES (?1, 1000, ?2)",
                        rusqlite::params![campaign_id, spend],
                    )
                    .expect("budget should insert");
            }
        }
        MetricResolver::new(manager)
    }

    #[test]
    fn metric_names_parse_case_insensitively() {
        assert_eq!("ROAS".parse::<Metric>(), Ok(Metric::Roas));
        assert_eq!(" Ctr_Percentage ".parse::<Metric>(), Ok(Metric::CtrPercentage));
        assert_eq!(Metric::Cpm.to_string(), "cpm");
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let error = "revenue; DROP TABLE products"
            .parse::<Metric>()
            .expect_err("unknown metric must fail");
        assert!(matches!(error, ValidationError::InvalidMetric { .. }));
        assert!(error.to_string().contains("roas, roi, ctr_percentage, cpa, cpc, cpm"));
    }

    #[test]
    fn lookup_projection_ends_with_metric_column() {
        let sql = lookup_sql(Metric::Cpa);
        assert!(sql.starts_with("SELECT product_name, month_number, year, campaign_name"));
        assert!(sql.contains("actual_spend, cpa FROM campaign_performance"));
    }

    #[test]
    fn missing_parameters_are_reported_in_order() {
        let resolver = resolver_with_rows(&[]);
        let mut request = MetricRequest {
            product: None,
            month: Some(5),
            metric: Some("roas".to_string()),
            year: 2024,
        };
        let error = resolver.compute(&request).expect_err("product is required");
        assert_eq!(error.to_string(), "missing parameter: product is required");

        request.product = Some("Product A".to_string());
        request.month = None;
        let error = resolver.compute(&request).expect_err("month is required");
        assert_eq!(error.to_string(), "missing parameter: month is required");

        request.month = Some(5);
        request.metric = Some(String::new());
        let error = resolver.compute(&request).expect_err("metric is required");
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn compute_matches_product_case_insensitively() {
        let resolver = resolver_with_rows(&[("Product A", 5, 2024, 1000.0, 500.0)]);
        let row = resolver
            .compute(&MetricRequest {
                product: Some("product a".to_string()),
                month: Some(5),
                metric: Some("ROAS".to_string()),
                year: 2024,
            })
            .expect("lookup should succeed");

        assert_eq!(row.get("roas").and_then(|v| v.as_f64()), Some(2.0));
        assert_eq!(row.get("product_name"), Some(&json!("Product A")));
        assert!(row.get("roi").is_none());
    }

    #[test]
    fn compute_reports_not_found_with_coordinates() {
        let resolver = resolver_with_rows(&[("Product A", 5, 2024, 1000.0, 500.0)]);
        let error = resolver
            .compute(&MetricRequest {
                product: Some("Product A".to_string()),
                month: Some(6),
                metric: Some("roi".to_string()),
                year: 2024,
            })
            .expect_err("missing month must not be found");

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.to_string(), "no data found for Product A 6/2024");
    }

    #[test]
    fn aggregate_filters_and_orders_rows() {
        let resolver = resolver_with_rows(&[
            ("Product B", 2, 2024, 300.0, 100.0),
            ("Product A", 3, 2024, 300.0, 100.0),
            ("Product A", 1, 2024, 300.0, 100.0),
            ("Product A", 1, 2025, 300.0, 100.0),
        ]);

        let all_2024 = resolver
            .aggregate(&PerformanceFilter::default())
            .expect("aggregate should succeed");
        let keys = all_2024
            .data
            .iter()
            .map(|row| (row["product_name"].clone(), row["month_number"].clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![
                (json!("Product A"), json!(1)),
                (json!("Product A"), json!(3)),
                (json!("Product B"), json!(2)),
            ]
        );

        let product_month = resolver
            .aggregate(&PerformanceFilter {
                product: Some("PRODUCT A".to_string()),
                month: Some(1),
                year: 2025,
            })
            .expect("aggregate should succeed");
        assert_eq!(product_month.row_count, 1);
    }

    #[test]
    fn aggregate_without_matches_is_empty_not_error() {
        let resolver = resolver_with_rows(&[("Product A", 5, 2024, 1000.0, 500.0)]);
        let rows = resolver
            .aggregate(&PerformanceFilter {
                year: 1999,
                ..PerformanceFilter::default()
            })
            .expect("empty aggregate should succeed");
        assert!(rows.is_empty());
        assert_eq!(rows.row_count, 0);
    }
}
