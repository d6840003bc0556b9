//! Storage traits and error types
//!
//! This module defines the key/value interface the discovery pipeline
//! persists through, and the associated error types.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for durable key/value storage backends
///
/// Keys are `/`-separated paths; values are JSON documents. Implementations
/// must be safe to share between tasks.
pub trait Store: Send + Sync {
    /// Writes a value, replacing any previous value under the key
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Reads a value, returning None if the key was never written
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
}
