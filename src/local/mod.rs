//! Local key-value persistence used as the fallback and mirror store.
//!
//! Each collection lives under a fixed key (see
//! [`Collection::storage_key`](crate::models::Collection::storage_key)) and
//! holds a JSON array of records.

mod memory;
mod seed;
mod sqlite;

pub use memory::MemoryStore;
pub use seed::seed_defaults;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::path::PathBuf;

/// Errors that can occur in a local store.
#[derive(Debug)]
pub enum LocalStoreError {
    /// I/O error preparing the store location.
    IoError(PathBuf, std::io::Error),
    /// Database error.
    DatabaseError(sqlx::Error),
    /// Failed to apply schema migrations.
    MigrationError(sqlx::migrate::MigrateError),
}

impl std::fmt::Display for LocalStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalStoreError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            LocalStoreError::DatabaseError(e) => write!(f, "Local database error: {}", e),
            LocalStoreError::MigrationError(e) => write!(f, "Local database migration failed: {}", e),
        }
    }
}

impl std::error::Error for LocalStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LocalStoreError::IoError(_, e) => Some(e),
            LocalStoreError::DatabaseError(e) => Some(e),
            LocalStoreError::MigrationError(e) => Some(e),
        }
    }
}

impl From<sqlx::Error> for LocalStoreError {
    fn from(e: sqlx::Error) -> Self {
        LocalStoreError::DatabaseError(e)
    }
}

/// A persistent string key-value store.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;

    /// Removes `key`. Returns true if it existed.
    async fn remove(&self, key: &str) -> Result<bool, LocalStoreError>;
}
