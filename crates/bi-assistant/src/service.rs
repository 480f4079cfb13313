use std::sync::Arc;

use crate::config::ServerConfig;
use crate::metrics::{MetricRequest, MetricResolver, PerformanceFilter};
use crate::models::{BiError, QueryRows, Row};
use crate::query::QueryExecutor;
use crate::schema::{SchemaDescription, SchemaIntrospector};
use crate::sqlite::ConnectionManager;

/// The four read-only operations over one shared connection.
#[derive(Debug, Clone)]
pub struct BiAssistant {
    connections: Arc<ConnectionManager>,
    introspector: SchemaIntrospector,
    executor: QueryExecutor,
    resolver: MetricResolver,
    default_year: i64,
}

impl BiAssistant {
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_connections(
            Arc::new(ConnectionManager::from_config(config)),
            config.default_year,
        )
    }

    #[must_use]
    pub fn with_connections(connections: Arc<ConnectionManager>, default_year: i64) -> Self {
        Self {
            introspector: SchemaIntrospector::new(Arc::clone(&connections)),
            executor: QueryExecutor::new(Arc::clone(&connections)),
            resolver: MetricResolver::new(Arc::clone(&connections)),
            connections,
            default_year,
        }
    }

    #[must_use]
    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    #[must_use]
    pub fn default_year(&self) -> i64 {
        self.default_year
    }

    pub fn describe_schema(&self) -> Result<SchemaDescription, BiError> {
        self.introspector.describe()
    }

    pub fn run_sql(&self, query: &str) -> Result<QueryRows, BiError> {
        self.executor.run_ad_hoc(query)
    }

    pub fn aggregate_performance(&self, filter: &PerformanceFilter) -> Result<QueryRows, BiError> {
        self.resolver.aggregate(filter)
    }

    pub fn compute_metric(&self, request: &MetricRequest) -> Result<Row, BiError> {
        self.resolver.compute(request)
    }
}
