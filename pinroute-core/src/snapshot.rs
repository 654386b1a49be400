//! Snapshot export and key-value persistence of the marker registry.
//!
//! The persisted form is a JSON array of
//! `{ "lat": number, "lng": number, "name": string, "listId": string }`
//! objects. There is no version field, so any schema change is breaking.

use std::collections::HashMap;

use geo::Coord;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::point::{LocationPoint, PointId, lat_lng};
#[cfg(feature = "serde")]
use crate::registry::MarkerRegistry;

/// Storage key used by the browser build.
pub const DEFAULT_STORAGE_KEY: &str = "myMarkers";

/// One persisted point: position, label and category.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SnapshotEntry {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Point label.
    pub name: String,
    /// Category name.
    #[cfg_attr(feature = "serde", serde(rename = "listId"))]
    pub list_id: String,
}

impl SnapshotEntry {
    /// Build an entry from a coordinate, label and category.
    ///
    /// # Examples
    /// ```
    /// use pinroute_core::{SnapshotEntry, lat_lng};
    ///
    /// let entry = SnapshotEntry::new(lat_lng(35.0, 139.0), "Shrine", "temples");
    /// assert_eq!(entry.lat, 35.0);
    /// assert_eq!(entry.list_id, "temples");
    /// ```
    #[must_use]
    pub fn new(position: Coord<f64>, name: impl Into<String>, list_id: impl Into<String>) -> Self {
        Self {
            lat: position.y,
            lng: position.x,
            name: name.into(),
            list_id: list_id.into(),
        }
    }

    /// The entry's position as a `geo` coordinate.
    #[must_use]
    pub const fn position(&self) -> Coord<f64> {
        lat_lng(self.lat, self.lng)
    }
}

impl From<&LocationPoint> for SnapshotEntry {
    fn from(point: &LocationPoint) -> Self {
        Self::new(point.position(), point.label(), point.category())
    }
}

/// Outcome of [`MarkerRegistry::restore`](crate::MarkerRegistry::restore).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Identifiers assigned to restored points, in snapshot order.
    pub restored: Vec<PointId>,
    /// Number of entries rejected by validation.
    pub skipped: usize,
}

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("failed to access {location}: {source}")]
    Io {
        /// File, table or other medium being accessed.
        location: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The backing medium holds data the store cannot interpret.
    #[error("{location} is not in the expected format: {source}")]
    Format {
        /// File, table or other medium being decoded or encoded.
        location: String,
        /// Underlying decoding error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Minimal string key-value store used to persist snapshots.
pub trait KeyValueStore {
    /// Fetch the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing medium cannot be written.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Errors from [`save_registry`] and [`load_registry`].
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The snapshot could not be encoded or decoded.
    #[cfg(feature = "serde")]
    #[error("snapshot under {key:?} is not valid JSON: {source}")]
    Format {
        /// Store key being read or written.
        key: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Serialise the registry's snapshot and write it under `key`.
///
/// # Errors
///
/// Returns [`SnapshotError`] when encoding or the store write fails.
///
/// # Examples
/// ```
/// use pinroute_core::{
///     KeyValueStore, MarkerRegistry, MemoryKeyValueStore, lat_lng, save_registry,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = MarkerRegistry::new();
/// registry.add(lat_lng(37.0, -122.0), "Blue Door", "cafe")?;
/// let mut store = MemoryKeyValueStore::default();
/// save_registry(&mut store, "myMarkers", &registry)?;
/// let raw = store.get("myMarkers")?.unwrap_or_default();
/// assert!(raw.contains("\"listId\":\"cafe\""));
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "serde")]
pub fn save_registry<S>(
    store: &mut S,
    key: &str,
    registry: &MarkerRegistry,
) -> Result<(), SnapshotError>
where
    S: KeyValueStore + ?Sized,
{
    let payload =
        serde_json::to_string(&registry.snapshot()).map_err(|source| SnapshotError::Format {
            key: key.to_owned(),
            source,
        })?;
    store.set(key, payload)?;
    Ok(())
}

/// Read the snapshot stored under `key` and restore it into `registry`.
///
/// A missing key restores nothing.
///
/// # Errors
///
/// Returns [`SnapshotError`] when the store read or decoding fails.
#[cfg(feature = "serde")]
pub fn load_registry<S>(
    store: &S,
    key: &str,
    registry: &mut MarkerRegistry,
) -> Result<RestoreSummary, SnapshotError>
where
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(RestoreSummary::default());
    };
    let entries: Vec<SnapshotEntry> =
        serde_json::from_str(&raw).map_err(|source| SnapshotError::Format {
            key: key.to_owned(),
            source,
        })?;
    Ok(registry.restore(entries))
}
