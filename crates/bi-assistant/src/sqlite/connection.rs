use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use rusqlite::Connection;
use tracing::{debug, error, info, warn};

use crate::config::{ServerConfig, resolve_store_locator};
use crate::models::BiError;

/// Exclusive access to the shared connection for the lifetime of the guard.
pub type ConnectionHandle<'a> = MappedMutexGuard<'a, Connection>;

/// Owns the one store connection shared by every operation.
///
/// The connection is opened on the first `acquire` and kept for the life of
/// the manager. A failed open leaves the manager unconnected, so the next
/// `acquire` tries again and reports the same failure until its cause goes
/// away. Access is serialized: a handle holds the internal lock until dropped,
/// and callers must not acquire twice on the same thread.
#[derive(Debug)]
pub struct ConnectionManager {
    database_url: String,
    slot: Mutex<Option<Connection>>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            slot: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.database_url.clone())
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub fn locator(&self) -> &str {
        resolve_store_locator(&self.database_url)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn acquire(&self) -> Result<ConnectionHandle<'_>, BiError> {
        let mut slot = self.slot.lock();
        let connection = match slot.take() {
            Some(connection) => connection,
            None => self.open()?,
        };

        Ok(MutexGuard::map(slot, |slot| slot.insert(connection)))
    }

    /// Drops the connection and returns to the unconnected state. Returns
    /// whether a connection was open.
    pub fn teardown(&self) -> bool {
        let Some(connection) = self.slot.lock().take() else {
            return false;
        };
        if let Err((_, close_error)) = connection.close() {
            warn!(locator = self.locator(), error = %close_error, "sqlite close reported an error");
        }
        debug!(locator = self.locator(), "sqlite connection torn down");
        true
    }

    fn open(&self) -> Result<Connection, BiError> {
        let locator = self.locator();
        match Connection::open(locator) {
            Ok(connection) => {
                info!(locator, "sqlite database connected");
                Ok(connection)
            }
            Err(source) => {
                error!(locator, error = %source, "failed to connect to sqlite database");
                Err(BiError::Connection {
                    locator: locator.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionManager;
    use crate::models::ErrorKind;

    #[test]
    fn starts_unconnected_and_connects_lazily() {
        let manager = ConnectionManager::new(":memory:");
        assert!(!manager.is_connected());

        {
            let handle = manager.acquire().expect("in-memory open should succeed");
            handle
                .execute_batch("CREATE TABLE marker (id INTEGER)")
                .expect("marker table should be creatable");
        }
        assert!(manager.is_connected());
    }

    #[test]
    fn repeated_acquire_returns_same_connection() {
        let manager = ConnectionManager::new("sqlite://:memory:");
        manager
            .acquire()
            .expect("first acquire should succeed")
            .execute_batch("CREATE TABLE marker (id INTEGER)")
            .expect("marker table should be creatable");

        // A fresh in-memory connection would not see the table.
        let count = manager
            .acquire()
            .expect("second acquire should succeed")
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'marker'",
                [],
                |row| row.get::<usize, i64>(0),
            )
            .expect("catalog query should succeed");
        assert_eq!(count, 1);
    }

    #[test]
    fn teardown_returns_to_unconnected() {
        let manager = ConnectionManager::new(":memory:");
        assert!(!manager.teardown());
        drop(manager.acquire().expect("open should succeed"));
        assert!(manager.teardown());
        assert!(!manager.is_connected());
    }

    #[test]
    fn open_failure_is_a_connection_error_and_recurs() {
        let manager = ConnectionManager::new("sqlite:///nonexistent-dir-for-bi-tests/sub/bi.db");
        for _ in 0..2 {
            let error = manager.acquire().expect_err("open should fail");
            assert_eq!(error.kind(), ErrorKind::Connection);
            assert!(!manager.is_connected());
        }
    }
}
