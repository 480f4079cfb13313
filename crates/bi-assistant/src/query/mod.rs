pub mod guard;

use std::sync::Arc;

use rusqlite::{Connection, Params};
use tracing::debug;

use crate::models::{BiError, QueryRows, Row};
use crate::sqlite::{ConnectionManager, collect_rows};

/// Runs caller-supplied SQL after it passes the guard.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    connections: Arc<ConnectionManager>,
}

impl QueryExecutor {
    #[must_use]
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    /// Rejected queries never reach the store: the guard runs before the
    /// connection is acquired.
    pub fn run_ad_hoc(&self, query: &str) -> Result<QueryRows, BiError> {
        let statement = guard::check(query)?;
        let connection = self.connections.acquire()?;
        let rows = execute_read_only(&connection, statement, [])?;
        Ok(QueryRows::new(rows))
    }
}

/// Prepares and runs a single read statement with bound parameters. Composed
/// statements go through the guard too.
pub(crate) fn execute_read_only<P: Params>(
    connection: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Row>, BiError> {
    let sql = guard::check(sql)?;
    debug!(sql, "executing read-only statement");
    let mut statement = connection
        .prepare(sql)
        .map_err(BiError::query("SQL error"))?;
    collect_rows(&mut statement, params).map_err(BiError::query("SQL error"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::QueryExecutor;
    use crate::models::ErrorKind;
    use crate::sqlite::ConnectionManager;

    #[test]
    fn rejected_query_does_not_open_the_store() {
        let manager = Arc::new(ConnectionManager::new(":memory:"));
        let executor = QueryExecutor::new(Arc::clone(&manager));

        let error = executor
            .run_ad_hoc("DELETE FROM products")
            .expect_err("delete must be rejected");
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert!(!manager.is_connected());
    }

    #[test]
    fn row_count_matches_data_length() {
        let manager = Arc::new(ConnectionManager::new(":memory:"));
        let executor = QueryExecutor::new(manager);

        let rows = executor
            .run_ad_hoc("WITH n(x) AS (VALUES (1), (2), (3)) SELECT x FROM n")
            .expect("cte query should run");
        assert_eq!(rows.row_count, 3);
        assert_eq!(rows.row_count, rows.data.len());
    }

    #[test]
    fn store_faults_surface_as_query_errors() {
        let manager = Arc::new(ConnectionManager::new(":memory:"));
        let executor = QueryExecutor::new(manager);

        let error = executor
            .run_ad_hoc("SELECT missing_column FROM missing_table")
            .expect_err("unknown table must fail");
        assert_eq!(error.kind(), ErrorKind::Query);
        assert!(error.to_string().contains("no such table"));
    }
}
