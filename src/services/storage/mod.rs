//! Key/value persistence for the preferences blob.
//!
//! Every backend stores one JSON string under [`PREFERENCES_KEY`]. The
//! preference service owns (de)serialisation; stores only move text.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rusqlite::{Connection, OptionalExtension};

use crate::models::settings::{StorageBackend, StorageSettings};

/// Fixed key the preferences record lives under.
pub const PREFERENCES_KEY: &str = "schedulePreferences";

/// Persistent storage for the raw preferences blob.
pub trait PreferenceStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<String>>;

    fn save(&self, data: &str) -> Result<()>;
}

/// Open the store selected in the settings.
pub fn store_from_settings(settings: &StorageSettings) -> Result<Box<dyn PreferenceStore>> {
    match settings.backend {
        StorageBackend::Memory => Ok(Box::new(MemoryStore::default())),
        StorageBackend::Json => {
            let path = match settings.path {
                Some(ref path) => path.clone(),
                None => default_data_dir()?.join("preferences.json"),
            };
            Ok(Box::new(JsonFileStore::new(path)))
        }
        StorageBackend::Sqlite => {
            let path = match settings.path {
                Some(ref path) => path.clone(),
                None => default_data_dir()?.join("preferences.db"),
            };
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create dir {}", parent.display()))?;
            }
            Ok(Box::new(SqliteStore::open(&path)?))
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "cruise-schedule", "cruise-schedule")
        .context("Failed to resolve a data directory for preferences")?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Single JSON file on disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFileStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read preferences from {}", self.path.display()))?;
        Ok(Some(data))
    }

    fn save(&self, data: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create dir {}", parent.display()))?;
        }

        fs::write(&self.path, data)
            .with_context(|| format!("failed to write preferences to {}", self.path.display()))?;
        Ok(())
    }
}

/// SQLite-backed key/value table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`; `":memory:"` works too.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS preferences (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                )",
                [],
            )
            .context("Failed to create preferences table")?;
        Ok(())
    }
}

impl PreferenceStore for SqliteStore {
    fn load(&self) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [PREFERENCES_KEY],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to load preferences")
    }

    fn save(&self, data: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO preferences (key, value, updated_at)
                 VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = CURRENT_TIMESTAMP",
                (PREFERENCES_KEY, data),
            )
            .context("Failed to save preferences")?;
        Ok(())
    }
}

/// Process-local store for tests and headless runs.
#[derive(Default)]
pub struct MemoryStore {
    data: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: RefCell::new(Some(data.into())),
        }
    }

    /// Last saved blob
    pub fn snapshot(&self) -> Option<String> {
        self.data.borrow().clone()
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.data.borrow().clone())
    }

    fn save(&self, data: &str) -> Result<()> {
        *self.data.borrow_mut() = Some(data.to_string());
        Ok(())
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for &S {
    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }

    fn save(&self, data: &str) -> Result<()> {
        (**self).save(data)
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }

    fn save(&self, data: &str) -> Result<()> {
        (**self).save(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_json_store_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("prefs.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_json_store_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/prefs.json"));
        store.save(r#"{"favorites":[]}"#).unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some(r#"{"favorites":[]}"#));
    }

    #[test]
    fn test_sqlite_store_upserts() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.load().unwrap().is_none());

        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("second"));

        let rows: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM preferences", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_sqlite_store_persists_across_connections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.save("kept").unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::default();
        assert!(store.load().unwrap().is_none());
        store.save("x").unwrap();
        assert_eq!(store.snapshot().as_deref(), Some("x"));
    }

    #[test]
    fn test_store_from_settings_memory() {
        let settings = StorageSettings {
            backend: StorageBackend::Memory,
            path: None,
        };
        let store = store_from_settings(&settings).unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
