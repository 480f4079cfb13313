//! Static documentation returned alongside the introspected tables. These
//! entries describe the data for discovery; nothing here is evaluated.

use crate::sqlite::PERFORMANCE_VIEW;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewDoc {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMetricDoc {
    pub name: &'static str,
    pub formula: &'static str,
}

const VIEW_DOCS: &[ViewDoc] = &[ViewDoc {
    name: PERFORMANCE_VIEW,
    description: "Comprehensive view joining all tables with calculated metrics",
}];

const KEY_METRIC_DOCS: &[KeyMetricDoc] = &[
    KeyMetricDoc {
        name: "ROAS",
        formula: "Return on Ad Spend (revenue / actual_spend)",
    },
    KeyMetricDoc {
        name: "ROI",
        formula: "Return on Investment ((revenue - actual_spend) / actual_spend)",
    },
    KeyMetricDoc {
        name: "CTR",
        formula: "Click-Through Rate (clicks / impressions * 100)",
    },
    KeyMetricDoc {
        name: "CPA",
        formula: "Cost Per Acquisition (actual_spend / conversions)",
    },
    KeyMetricDoc {
        name: "CPC",
        formula: "Cost Per Click (actual_spend / clicks)",
    },
    KeyMetricDoc {
        name: "CPM",
        formula: "Cost Per Mille (actual_spend / impressions * 1000)",
    },
];

#[must_use]
pub fn view_docs() -> &'static [ViewDoc] {
    VIEW_DOCS
}

#[must_use]
pub fn key_metric_docs() -> &'static [KeyMetricDoc] {
    KEY_METRIC_DOCS
}
