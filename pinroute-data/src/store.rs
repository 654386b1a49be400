//! File-backed [`KeyValueStore`].
//!
//! The file holds a single JSON object mapping keys to string values, so one
//! file can carry several snapshots side by side.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use pinroute_core::{KeyValueStore, StoreError};

type Entries = BTreeMap<String, String>;

/// Key-value store persisted as a JSON object in one UTF-8 file.
///
/// A missing file reads as empty. Writes replace the whole file atomically.
///
/// # Examples
/// ```no_run
/// use pinroute_core::{DEFAULT_STORAGE_KEY, MarkerRegistry, load_registry};
/// use pinroute_data::FileKeyValueStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FileKeyValueStore::new("pinroute.json");
/// let mut registry = MarkerRegistry::new();
/// load_registry(&store, DEFAULT_STORAGE_KEY, &mut registry)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKeyValueStore {
    path: Utf8PathBuf,
}

impl FileKeyValueStore {
    /// Create a store backed by `path`. Nothing is read until first use.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries, StoreError> {
        let Some(raw) = pinroute_fs::read_utf8_file(&self.path).map_err(|err| self.io(err))?
        else {
            return Ok(Entries::new());
        };
        if raw.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&raw).map_err(|err| self.format(err))
    }

    fn io(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            location: self.path.to_string(),
            source,
        }
    }

    fn format(&self, source: serde_json::Error) -> StoreError {
        StoreError::Format {
            location: self.path.to_string(),
            source: Box::new(source),
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_owned(), value);
        let payload = serde_json::to_string_pretty(&entries).map_err(|err| self.format(err))?;
        pinroute_fs::write_utf8_file(&self.path, &payload).map_err(|err| self.io(err))?;
        debug!("stored {key:?} in {}", self.path);
        Ok(())
    }
}
