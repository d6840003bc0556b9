//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait,
//! plus the run bookkeeping recorded alongside each discovery.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Store, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection lock poisoned".to_string()))
    }

    // ===== Run Management =====

    /// Records the start of a discovery run and returns its id
    pub fn create_run(&self, location: &str, config_hash: &str) -> StorageResult<i64> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO runs (location, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![location, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Marks a run as finished with its final status
    pub fn finish_run(
        &self,
        run_id: i64,
        status: RunStatus,
        competitors_found: Option<usize>,
    ) -> StorageResult<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        let updated = conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, competitors_found = ?3 WHERE id = ?4",
            params![
                status.to_db_string(),
                now,
                competitors_found.map(|n| n as i64),
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    /// Gets a run by ID
    pub fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, location, started_at, finished_at, config_hash, status, competitors_found
             FROM runs WHERE id = ?1",
            params![run_id],
            run_from_row,
        )
        .optional()?
        .ok_or(StorageError::RunNotFound(run_id))
    }

    /// Gets the most recent run for a location
    pub fn get_latest_run(&self, location: &str) -> StorageResult<Option<RunRecord>> {
        let conn = self.conn()?;
        let run = conn
            .query_row(
                "SELECT id, location, started_at, finished_at, config_hash, status, competitors_found
                 FROM runs WHERE location = ?1 ORDER BY id DESC LIMIT 1",
                params![location],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    /// Counts stored records whose key starts with `prefix`
    pub fn count_records(&self, prefix: &str) -> StorageResult<u64> {
        let conn = self.conn()?;
        let pattern = format!("{}%", escape_like(prefix));
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE key LIKE ?1 ESCAPE '\\'",
            params![pattern],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl Store for SqliteStore {
    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO records (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM records WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        location: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Running),
        competitors_found: row.get::<_, Option<i64>>(6)?.map(|n| n as usize),
    })
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
