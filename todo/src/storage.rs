//! Durable storage for the todo collection.
//!
//! The collection lives as one JSON array under a fixed key in a host
//! provided [`KeyValueStore`]. On a terminal host that store is
//! [`FileKeyValueStore`], a single JSON file of string entries.

use crate::types::TodoItem;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use todo_core::environment::{KeyValueStore, StorageError};

/// Key under which the collection is stored
pub const STORAGE_KEY: &str = "todos";

/// Reads and writes the todo collection
///
/// Constructed without a backing store, it behaves as a host that has no
/// persistent storage: loads are empty and saves report
/// [`StorageError::Unavailable`].
#[derive(Clone)]
pub struct TodoStorage {
    store: Option<Arc<dyn KeyValueStore>>,
}

impl TodoStorage {
    /// Storage backed by `store`
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Storage for a host without persistence
    #[must_use]
    pub const fn unavailable() -> Self {
        Self { store: None }
    }

    /// Whether a backing store is attached
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.store.is_some()
    }

    /// Load the persisted collection
    ///
    /// Never fails. A missing store, a missing key, an unreadable store, and
    /// malformed stored data all yield an empty collection; the latter two are
    /// logged.
    #[must_use]
    pub fn load(&self) -> Vec<TodoItem> {
        let Some(store) = &self.store else {
            tracing::debug!("No persistent storage, starting empty");
            return Vec::new();
        };

        let raw = match store.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                tracing::warn!(%error, "Could not read stored todos, starting empty");
                return Vec::new();
            },
        };

        match serde_json::from_str(&raw) {
            Ok(todos) => todos,
            Err(error) => {
                tracing::warn!(%error, "Stored todos are malformed, starting empty");
                Vec::new()
            },
        }
    }

    /// Replace the persisted collection with `todos`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] without a backing store, and
    /// whatever the store reports if the write fails.
    pub fn save(&self, todos: &[TodoItem]) -> Result<(), StorageError> {
        let store = self.store.as_ref().ok_or(StorageError::Unavailable)?;
        let json = serde_json::to_string(todos)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        store.set_item(STORAGE_KEY, &json)
    }
}

impl std::fmt::Debug for TodoStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStorage")
            .field("available", &self.is_available())
            .finish()
    }
}

/// Key-value store persisted as one JSON object file
///
/// Every call reads or rewrites the whole file, so other processes using the
/// same path see each committed write. Writes go to a sibling temp file that
/// is then renamed over the original.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    /// Store backed by the file at `path`; the file is created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            StorageError::Corrupt(format!("{}: {e}", self.path.display()))
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = match self.read_entries() {
            Err(StorageError::Corrupt(reason)) => {
                tracing::warn!(%reason, "Replacing corrupt storage file");
                BTreeMap::new()
            },
            other => other?,
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
