//! Storage module for persisting discovery results
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Hierarchical key/value records for locations, competitors and products
//! - Run tracking for every discovery

mod persist;
mod schema;
mod sqlite;
mod traits;

pub use persist::{competitor_key, load_location, location_key, persist_search_result, product_key};
pub use sqlite::SqliteStore;
pub use traits::{StorageError, StorageResult, Store};

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// Represents a discovery run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub location: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub competitors_found: Option<usize>,
}

/// Status of a discovery run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
