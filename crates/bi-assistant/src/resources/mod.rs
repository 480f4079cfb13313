use serde::Serialize;
use serde_json::json;

use crate::models::ValidationError;
use crate::schema::key_metric_docs;
use crate::sqlite::{
    BUDGETS_TABLE, CAMPAIGN_MONTHS_TABLE, MARKETING_METRICS_TABLE, PERFORMANCE_VIEW,
    PRODUCTS_TABLE,
};

pub const SCHEMA_URI: &str = "bi://schema";
pub const EXAMPLES_URI: &str = "bi://examples";
pub const METRICS_URI: &str = "bi://metrics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    SchemaSummary,
    UsageExamples,
    MetricDefinitions,
}

impl ResourceKind {
    pub const ALL: [Self; 3] = [
        Self::SchemaSummary,
        Self::UsageExamples,
        Self::MetricDefinitions,
    ];

    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::SchemaSummary => SCHEMA_URI,
            Self::UsageExamples => EXAMPLES_URI,
            Self::MetricDefinitions => METRICS_URI,
        }
    }

    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::SchemaSummary => "application/json",
            Self::UsageExamples | Self::MetricDefinitions => "text/markdown",
        }
    }

    /// Accepts the full URI or its bare name (`schema`, `examples`, `metrics`).
    pub fn from_uri(uri: &str) -> Result<Self, ValidationError> {
        let trimmed = uri.trim();
        Self::ALL
            .into_iter()
            .find(|kind| {
                let uri = kind.uri();
                trimmed == uri || uri.strip_prefix("bi://") == Some(trimmed)
            })
            .ok_or_else(|| ValidationError::UnknownResource(uri.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDocument {
    pub uri: &'static str,
    pub mime_type: &'static str,
    pub text: String,
}

#[must_use]
pub fn read(kind: ResourceKind) -> ResourceDocument {
    let text = match kind {
        ResourceKind::SchemaSummary => schema_summary(),
        ResourceKind::UsageExamples => USAGE_EXAMPLES.trim().to_string(),
        ResourceKind::MetricDefinitions => metric_definitions(),
    };

    ResourceDocument {
        uri: kind.uri(),
        mime_type: kind.mime_type(),
        text,
    }
}

fn schema_summary() -> String {
    let summary = json!({
        "tables": [
            PRODUCTS_TABLE,
            CAMPAIGN_MONTHS_TABLE,
            MARKETING_METRICS_TABLE,
            BUDGETS_TABLE,
        ],
        "main_view": PERFORMANCE_VIEW,
        "purpose": "Track and analyze marketing campaign effectiveness",
        "description": "BI database contains marketing campaign performance data",
    });
    serde_json::to_string_pretty(&summary).unwrap_or_else(|_| summary.to_string())
}

const USAGE_EXAMPLES: &str = r#"
# BI Assistant Query Examples

## Basic Queries
- `run_sql("SELECT * FROM campaign_performance LIMIT 5")`
- `describe_schema()` - Get full database structure
- `aggregate_performance("Product A", 3, 2024)` - Get March 2024 data for Product A

## Metrics Available
- ROAS, ROI, CTR, CPA, CPC, CPM
- Use compute_metric() for a single product-month value

## Sample Queries
```sql
SELECT product_name, SUM(revenue) AS total_revenue
FROM campaign_performance
WHERE year = 2024
GROUP BY product_name;
```
"#;

fn metric_definitions() -> String {
    let mut text = String::from("# BI Metrics Documentation\n\n## Key Performance Indicators\n\n");
    for doc in key_metric_docs() {
        text.push_str(&format!("- **{}**: {}\n", doc.name, doc.formula));
    }
    text.push_str(
        "\nEvery ratio is 0 when its denominator is 0, and all six are rounded to 2 decimals.\n\
         \n## Usage\nUse these metrics with the compute_metric tool (roas, roi, ctr_percentage, \
         cpa, cpc, cpm) or in SQL queries against campaign_performance.",
    );
    text
}
