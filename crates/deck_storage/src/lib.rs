//! Persistent key-value preference store for RepoDeck.
//!
//! Provides SQLite-backed storage at ~/.repodeck/<app-identifier>/storage.db.
//! The shell persists small UI preferences here (theme flag, the last loaded
//! path list); the store itself is schema-free key/JSON-value.

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

// ============================================================================
// Error Types with Structured Codes
// ============================================================================

/// Error codes for storage operations (8100-8109)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum StorageErrorCode {
    /// Generic storage error
    Generic = 8100,
    /// Serialization error
    SerializationError = 8102,
    /// Deserialization error
    DeserializationError = 8103,
    /// Database error
    DatabaseError = 8104,
    /// Invalid key
    InvalidKey = 8106,
    /// Connection failed
    ConnectionFailed = 8108,
}

/// Custom error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("[{code}] Storage error: {message}")]
    Generic { code: u32, message: String },

    #[error("[{code}] Serialization error: {message}")]
    SerializationError { code: u32, message: String },

    #[error("[{code}] Deserialization error: {message}")]
    DeserializationError { code: u32, message: String },

    #[error("[{code}] Database error: {message}")]
    DatabaseError { code: u32, message: String },

    #[error("[{code}] Invalid key: {message}")]
    InvalidKey { code: u32, message: String },

    #[error("[{code}] Connection failed: {message}")]
    ConnectionFailed { code: u32, message: String },
}

impl StorageError {
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            code: StorageErrorCode::Generic as u32,
            message: message.into(),
        }
    }

    pub fn serialization_error(message: impl Into<String>) -> Self {
        Self::SerializationError {
            code: StorageErrorCode::SerializationError as u32,
            message: message.into(),
        }
    }

    pub fn deserialization_error(message: impl Into<String>) -> Self {
        Self::DeserializationError {
            code: StorageErrorCode::DeserializationError as u32,
            message: message.into(),
        }
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::DatabaseError {
            code: StorageErrorCode::DatabaseError as u32,
            message: message.into(),
        }
    }

    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            code: StorageErrorCode::InvalidKey as u32,
            message: message.into(),
        }
    }

    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            code: StorageErrorCode::ConnectionFailed as u32,
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        Self::database_error(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::serialization_error(e.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::generic(e.to_string())
    }
}

// ============================================================================
// Preference Store
// ============================================================================

/// Key-value preference store backed by a single SQLite database.
///
/// Cheap to clone; all clones share one connection behind an async mutex.
/// Values are stored as serialized JSON, so booleans round-trip as `true` /
/// `false` and lists as JSON arrays.
#[derive(Clone)]
pub struct PrefStore {
    db_path: PathBuf,
    connection: Arc<Mutex<Connection>>,
}

fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            created_at INTEGER DEFAULT (strftime('%s', 'now')),
            updated_at INTEGER DEFAULT (strftime('%s', 'now'))
        )",
        [],
    )?;

    conn.execute("CREATE INDEX IF NOT EXISTS idx_kv_key ON kv_store(key)", [])?;

    Ok(())
}

impl PrefStore {
    /// Open (or create) the store for the given app identifier under the
    /// platform data directory.
    pub async fn open(app_identifier: &str) -> Result<Self, StorageError> {
        let storage_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".repodeck")
            .join(app_identifier);

        tokio::fs::create_dir_all(&storage_dir).await?;

        let db_path = storage_dir.join("storage.db");
        let db_path_clone = db_path.clone();

        // Open database connection in a blocking task
        let connection =
            tokio::task::spawn_blocking(move || -> Result<Connection, StorageError> {
                let conn = Connection::open(&db_path_clone)?;
                init_schema(&conn)?;
                Ok(conn)
            })
            .await
            .map_err(|e| StorageError::connection_failed(e.to_string()))??;

        debug!(path = %db_path.display(), "storage.open");

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// In-memory store; contents are dropped with the last clone.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Get a value by key
    pub async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        debug!(key = %key, "storage.get");

        let conn = self.connection.lock().await;

        let result: Result<String, rusqlite::Error> = conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value_str) => {
                let value: serde_json::Value = serde_json::from_str(&value_str)
                    .map_err(|e| StorageError::deserialization_error(e.to_string()))?;
                Ok(Some(value))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    /// Set a value by key
    pub async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StorageError> {
        debug!(key = %key, "storage.set");

        if key.is_empty() {
            return Err(StorageError::invalid_key("Key cannot be empty"));
        }

        let value_str = serde_json::to_string(value)?;

        let conn = self.connection.lock().await;

        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, strftime('%s', 'now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = strftime('%s', 'now')",
            rusqlite::params![key, value_str],
        )?;

        Ok(())
    }

    /// Get a boolean preference. Returns None when the key is absent or the
    /// stored value is not a boolean.
    pub async fn get_bool(&self, key: &str) -> Result<Option<bool>, StorageError> {
        Ok(self.get(key).await?.and_then(|v| v.as_bool()))
    }

    /// Set a boolean preference
    pub async fn set_bool(&self, key: &str, value: bool) -> Result<(), StorageError> {
        self.set(key, &serde_json::Value::Bool(value)).await
    }

    /// Delete a key, returning whether it existed
    pub async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        debug!(key = %key, "storage.delete");

        let conn = self.connection.lock().await;
        let rows_affected = conn.execute("DELETE FROM kv_store WHERE key = ?", [key])?;

        Ok(rows_affected > 0)
    }

    /// Check if a key exists
    pub async fn has(&self, key: &str) -> Result<bool, StorageError> {
        let conn = self.connection.lock().await;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM kv_store WHERE key = ?)",
            [key],
            |row| row.get(0),
        )?;

        Ok(exists)
    }

    /// List all keys
    pub async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.connection.lock().await;

        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(keys)
    }

    /// Clear all data
    pub async fn clear(&self) -> Result<(), StorageError> {
        debug!("storage.clear");

        let conn = self.connection.lock().await;
        conn.execute("DELETE FROM kv_store", [])?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_key_reads_as_none() {
        let store = PrefStore::open_in_memory().unwrap();
        assert_eq!(store.get("dark").await.unwrap(), None);
        assert_eq!(store.get_bool("dark").await.unwrap(), None);
        assert!(!store.has("dark").await.unwrap());
    }

    #[tokio::test]
    async fn set_then_get_and_overwrite() {
        let store = PrefStore::open_in_memory().unwrap();

        store
            .set("paths", &serde_json::json!(["/a", "/b"]))
            .await
            .unwrap();
        assert_eq!(
            store.get("paths").await.unwrap(),
            Some(serde_json::json!(["/a", "/b"]))
        );

        store.set("paths", &serde_json::json!(["/c"])).await.unwrap();
        assert_eq!(
            store.get("paths").await.unwrap(),
            Some(serde_json::json!(["/c"]))
        );
    }

    #[tokio::test]
    async fn bool_helpers() {
        let store = PrefStore::open_in_memory().unwrap();

        store.set_bool("dark", true).await.unwrap();
        assert_eq!(store.get_bool("dark").await.unwrap(), Some(true));

        store.set_bool("dark", false).await.unwrap();
        assert_eq!(store.get_bool("dark").await.unwrap(), Some(false));

        // Non-boolean values read as None through the typed helper
        store.set("dark", &serde_json::json!("yes")).await.unwrap();
        assert_eq!(store.get_bool("dark").await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_key_is_rejected() {
        let store = PrefStore::open_in_memory().unwrap();
        let err = store.set("", &serde_json::json!(1)).await.unwrap_err();
        match err {
            StorageError::InvalidKey { code, .. } => {
                assert_eq!(code, StorageErrorCode::InvalidKey as u32);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn delete_has_keys_clear() {
        let store = PrefStore::open_in_memory().unwrap();

        store.set_bool("dark", true).await.unwrap();
        store.set("paths", &serde_json::json!([])).await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["dark", "paths"]);
        assert!(store.delete("dark").await.unwrap());
        assert!(!store.delete("dark").await.unwrap());
        assert!(store.has("paths").await.unwrap());

        store.clear().await.unwrap();
        assert!(store.keys().await.unwrap().is_empty());
    }
}
