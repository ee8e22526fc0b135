use rusqlite::{Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::ThemeMode;

/// Key holding the serialized task collection
pub const TASKS_KEY: &str = "task-manager-tasks-v2";
/// Key holding the light/dark preference
pub const THEME_KEY: &str = "task-manager-theme-v1";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create storage directory: {0}")]
    DirectoryError(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Get/set blob capability the task store persists through.
///
/// Implementations report failures; callers decide the fallback.
pub trait StorageAdapter {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError>;

    /// Short human-readable description for logs and the status line
    fn describe(&self) -> String;
}

/// Key-value table in a SQLite database file
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database and make sure the table exists
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(path)?;
        let storage = SqliteStorage { conn };
        storage.initialize_schema()?;
        debug!(path = %path.display(), "opened sqlite storage");
        Ok(storage)
    }

    /// In-memory SQLite database, gone when dropped
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let storage = SqliteStorage {
            conn: Connection::open_in_memory()?,
        };
        storage.initialize_schema()?;
        Ok(storage)
    }

    fn initialize_schema(&self) -> Result<(), StorageError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl StorageAdapter for SqliteStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let now = crate::utils::format_timestamp(chrono::Utc::now());
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, blob, now],
        )?;
        Ok(())
    }

    fn describe(&self) -> String {
        match self.conn.path() {
            Some(path) if !path.is_empty() => format!("sqlite:{}", path),
            _ => "sqlite:memory".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    failing: bool,
    saves: usize,
}

/// Process-local storage. Clones share the same map, which lets a caller keep a
/// handle for inspection after moving one into the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent load/save fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.inner.borrow_mut().failing = failing;
    }

    /// Write a raw value directly, bypassing the failure switch
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.inner
            .borrow_mut()
            .values
            .insert(key.to_string(), value.to_string());
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().values.get(key).cloned()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.inner.borrow().saves
    }
}

impl StorageAdapter for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let inner = self.inner.borrow();
        if inner.failing {
            return Err(StorageError::Unavailable("memory storage switched off".to_string()));
        }
        Ok(inner.values.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if inner.failing {
            return Err(StorageError::Unavailable("memory storage switched off".to_string()));
        }
        inner.values.insert(key.to_string(), blob.to_string());
        inner.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Open SQLite storage at `path`, or fall back to memory for this session
pub fn open_or_memory(path: &Path) -> Box<dyn StorageAdapter> {
    match SqliteStorage::open(path) {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "storage unavailable, running in-memory only");
            Box::new(MemoryStorage::new())
        }
    }
}

/// Read the stored theme. Missing, unreadable or unknown values give `fallback`.
pub fn load_theme(storage: &dyn StorageAdapter, fallback: ThemeMode) -> ThemeMode {
    match storage.load(THEME_KEY) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
            warn!(value = %raw, "ignoring unknown stored theme");
            fallback
        }),
        Ok(None) => fallback,
        Err(e) => {
            warn!(error = %e, "failed to load theme preference");
            fallback
        }
    }
}

/// Store the theme preference; failures are logged and otherwise ignored
pub fn save_theme(storage: &dyn StorageAdapter, mode: ThemeMode) {
    if let Err(e) = storage.save(THEME_KEY, mode.as_str()) {
        warn!(error = %e, "failed to save theme preference");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_round_trip_and_overwrite() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.load("k").unwrap(), None);
        storage.save("k", "one").unwrap();
        storage.save("k", "two").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn sqlite_file_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("app.db");
        {
            let storage = SqliteStorage::open(&path).unwrap();
            storage.save(TASKS_KEY, "[]").unwrap();
        }
        let reopened = SqliteStorage::open(&path).unwrap();
        assert_eq!(reopened.load(TASKS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn memory_failure_switch() {
        let storage = MemoryStorage::new();
        storage.save("k", "v").unwrap();
        storage.set_failing(true);
        assert!(storage.load("k").is_err());
        assert!(storage.save("k", "w").is_err());
        storage.set_failing(false);
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v"));
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn theme_falls_back_on_garbage_and_failure() {
        let storage = MemoryStorage::new();
        assert_eq!(load_theme(&storage, ThemeMode::Light), ThemeMode::Light);

        save_theme(&storage, ThemeMode::Dark);
        assert_eq!(load_theme(&storage, ThemeMode::Light), ThemeMode::Dark);

        storage.insert_raw(THEME_KEY, "sepia");
        assert_eq!(load_theme(&storage, ThemeMode::Dark), ThemeMode::Dark);

        storage.set_failing(true);
        save_theme(&storage, ThemeMode::Light);
        assert_eq!(load_theme(&storage, ThemeMode::Dark), ThemeMode::Dark);
    }

    #[test]
    fn unopenable_path_degrades_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file
        let storage = open_or_memory(dir.path());
        assert_eq!(storage.describe(), "memory");
        storage.save("k", "v").unwrap();
    }
}
