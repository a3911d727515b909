// 🗄️ Persistence Slot - one key, one JSON snapshot
// The entry store reads/writes the whole collection through this trait

use crate::error::StorageError;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

/// Key under which the entry collection is persisted
pub const STORAGE_KEY: &str = "frh-entries-v1";

/// Durable key-value backend. Reads and writes are whole values.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ============================================================================
// SQLITE SLOT
// ============================================================================

/// Key-value slot kept in a single SQLite table
pub struct SqliteSlot {
    conn: Connection,
}

impl SqliteSlot {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        setup_database(&conn)?;
        Ok(SqliteSlot { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(SqliteSlot { conn })
    }
}

pub fn setup_database(conn: &Connection) -> Result<(), StorageError> {
    // WAL keeps the last committed snapshot readable after a crash
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(())
}

impl KeyValueStore for SqliteSlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )?;

        Ok(())
    }
}

// ============================================================================
// IN-MEMORY SLOT (tests, throwaway sessions)
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct MemorySlot {
    values: HashMap<String, String>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded slot, handy for exercising `load`
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut slot = Self::new();
        slot.values.insert(key.to_string(), value.to_string());
        slot
    }
}

impl KeyValueStore for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
