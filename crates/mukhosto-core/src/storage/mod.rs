//! Storage Module
//!
//! Key-value persistence behind the schedule config and the review scheduler:
//! - `KeyValueStore` trait, the only seam the core talks to
//! - `MemoryStore` for tests and ephemeral sessions
//! - `SqliteStore` backed by a single SQLite table

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStore;
pub use migrations::MIGRATIONS;
pub use sqlite::{DB_FILE_NAME, SqliteStore};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Store refused the operation (disabled, read-only, quota)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// KEY-VALUE STORE
// ============================================================================

/// Synchronous byte-oriented key-value store.
///
/// Records are written whole: a `set` replaces the previous value entirely.
/// Implementations take `&self` so one store can be shared through an `Arc`
/// by the config and the scheduler.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
