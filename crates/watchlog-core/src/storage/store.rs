//! Store: SQLite-backed canonical copy of runs and fixes.
//!
//! The store is an explicitly constructed context object; importer and query
//! callers receive it by reference instead of reaching for a global
//! connection. Tests use [`Store::memory`].

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use super::schema::RUNS_SCHEMA;
use super::store_internal::{fixes, runs, stats};
use crate::errors::StoreError;
use crate::ids::RunId;
use crate::model::{Fix, GlobalStats, NamespaceStats, NewFix, Run};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

#[derive(Clone)]
pub struct Store {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open a file-backed store. Fails with [`StoreError::Unreachable`] when
    /// the database cannot be opened or does not answer a probe query.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let unreachable = |e: rusqlite::Error| StoreError::Unreachable {
            location: path.display().to_string(),
            reason: e.to_string(),
        };
        let conn = Connection::open(path).map_err(unreachable)?;
        Self::init_connection(&conn).map_err(unreachable)?;
        Ok(Self::wrap(conn))
    }

    /// Create an in-memory store (for testing).
    pub fn memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(&conn)?;
        Ok(Self::wrap(conn))
    }

    /// Create store from an existing connection (for multi-connection tests).
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::init_connection(&conn)?;
        Ok(Self::wrap(conn))
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn init_connection(conn: &Connection) -> rusqlite::Result<()> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // WAL mode for file-backed DBs (no-op for in-memory)
        let _ = conn.execute("PRAGMA journal_mode = WAL", []);
        conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
        Ok(())
    }

    /// Create tables and indexes if missing. Idempotent.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        self.lock()?.execute_batch(RUNS_SCHEMA)?;
        Ok(())
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    // Runs: writes

    /// Insert a freshly started run. The run must be `running`.
    pub fn create_run(&self, run: &Run) -> Result<(), StoreError> {
        let conn = self.lock()?;
        runs::create_run_impl(&conn, run)
    }

    /// Apply a run's terminal fields in one statement. Fails with
    /// [`StoreError::NotRunning`] if the stored row is missing or already
    /// terminal.
    pub fn complete_run(&self, run: &Run) -> Result<(), StoreError> {
        let conn = self.lock()?;
        runs::complete_run_impl(&conn, run)
    }

    /// Existence check and insert inside one immediate transaction, with the
    /// primary key as the final backstop against concurrent importers.
    pub fn insert_run_if_absent(&self, run: &Run) -> Result<InsertOutcome, StoreError> {
        let conn = self.lock()?;
        runs::insert_run_if_absent_impl(&conn, run)
    }

    // Runs: reads

    /// Newest `started_at` first. `None` means all namespaces.
    pub fn get_runs(&self, namespace: Option<&str>, limit: usize) -> Result<Vec<Run>, StoreError> {
        let conn = self.lock()?;
        runs::get_runs_impl(&conn, namespace, limit)
    }

    pub fn get_run(&self, id: RunId) -> Result<Run, StoreError> {
        let conn = self.lock()?;
        runs::get_run_impl(&conn, id)
    }

    pub fn count_runs(&self, namespace: Option<&str>) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        runs::count_runs_impl(&conn, namespace)
    }

    /// Latest `ended_at` among terminal runs of `namespace`.
    pub fn get_last_completed_time(
        &self,
        namespace: &str,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let conn = self.lock()?;
        runs::last_completed_time_impl(&conn, namespace)
    }

    // Aggregates

    /// One row per namespace, ordered by namespace name.
    pub fn get_namespace_stats(&self) -> Result<Vec<NamespaceStats>, StoreError> {
        let conn = self.lock()?;
        stats::namespace_stats_impl(&conn)
    }

    /// Stats for a single namespace; all zeros when it has no runs.
    pub fn get_stats_for_namespace(&self, namespace: &str) -> Result<NamespaceStats, StoreError> {
        let conn = self.lock()?;
        stats::stats_for_namespace_impl(&conn, namespace)
    }

    pub fn get_global_stats(&self) -> Result<GlobalStats, StoreError> {
        let conn = self.lock()?;
        stats::global_stats_impl(&conn)
    }

    // Fixes

    pub fn insert_fix(&self, fix: &NewFix) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        fixes::insert_fix_impl(&conn, fix)
    }

    /// Newest `timestamp` first.
    pub fn get_fixes(&self, limit: usize) -> Result<Vec<Fix>, StoreError> {
        let conn = self.lock()?;
        fixes::get_fixes_impl(&conn, limit)
    }

    pub fn get_fixes_by_run(&self, run_id: RunId) -> Result<Vec<Fix>, StoreError> {
        let conn = self.lock()?;
        fixes::get_fixes_by_run_impl(&conn, run_id)
    }
}
