//! Durable key-value storage for the tracking structures.
//!
//! The store only promises single-key atomicity at its interface; the
//! SQLite implementation additionally applies each `set` in one transaction.

mod memory;
mod retry;
mod sqlite;

pub use memory::MemoryKvStore;
pub use retry::{write_with_retry, RetryPolicy};
pub use sqlite::SqliteKvStore;

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

/// Storage keys. Only the names follow the browser extension; the
/// documents stored under them use this crate's own layout.
pub mod keys {
    pub const HISTORY: &str = "anime_history";
    pub const WATCH_COUNT: &str = "watch_count";
    pub const SERIES_STATUS: &str = "series_status";
    pub const PLANNING: &str = "anime_planning";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Trait for key-value storage backends.
pub trait KvStore: Send + Sync {
    /// Fetch the values stored under `keys`. Absent keys are omitted.
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError>;

    /// Store every entry of `entries`, replacing existing values.
    fn set(&self, entries: HashMap<String, Value>) -> Result<(), StorageError>;
}
