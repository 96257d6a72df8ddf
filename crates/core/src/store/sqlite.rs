//! SQLite-backed key-value store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::{KvStore, StorageError};

/// SQLite-backed key-value store. Values are stored as JSON text.
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Open (or create) the database file and the table if needed.
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("connection lock poisoned".to_string()))
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT value FROM kv_store WHERE key = ?")
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut values = HashMap::new();
        for key in keys {
            let raw: Option<String> = stmt
                .query_row(params![key], |row| row.get(0))
                .optional()
                .map_err(|e| StorageError::Database(e.to_string()))?;

            if let Some(raw) = raw {
                values.insert(key.to_string(), serde_json::from_str(&raw)?);
            }
        }

        Ok(values)
    }

    fn set(&self, entries: HashMap<String, Value>) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let updated_at = Utc::now().to_rfc3339();

        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        for (key, value) in &entries {
            let raw = serde_json::to_string(value)?;
            tx.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, raw, updated_at],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }
}
