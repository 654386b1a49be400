//! The marker registry: location points, their categories and visibility.
//!
//! The registry is a plain owned value. It performs no locking; callers that
//! share it between threads must wrap it in a mutex or drive it from a single
//! task.

use std::collections::BTreeMap;

use geo::Coord;
use log::debug;
use thiserror::Error;

use crate::category::{CategorySet, normalise_category};
use crate::point::{LocationPoint, PointId};
use crate::snapshot::{RestoreSummary, SnapshotEntry};

/// Errors returned by [`MarkerRegistry::add`].
///
/// Both variants leave the registry untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The label was empty after trimming whitespace.
    #[error("location label must not be empty")]
    EmptyLabel,
    /// Latitude or longitude was NaN or infinite.
    #[error("location coordinates must be finite")]
    NonFinitePosition,
}

/// Owns every [`LocationPoint`] and the [`CategorySet`] derived from them.
///
/// Identifiers increase monotonically, so iterating the id-keyed map yields
/// points in insertion order.
///
/// # Examples
/// ```
/// use pinroute_core::{MarkerRegistry, lat_lng};
///
/// # fn main() -> Result<(), pinroute_core::RegistryError> {
/// let mut registry = MarkerRegistry::new();
/// let cafe = registry.add(lat_lng(37.0, -122.0), "Blue Door", "cafe")?;
/// registry.add(lat_lng(38.0, -123.0), "Oak Meadow", "park")?;
///
/// registry.set_category_enabled("park", false);
/// let visible: Vec<_> = registry.visible_points().map(|p| p.id()).collect();
/// assert_eq!(visible, vec![cafe]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    points: BTreeMap<PointId, LocationPoint>,
    categories: CategorySet,
    next_id: u64,
}

impl MarkerRegistry {
    /// Construct an empty registry holding only the default category.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point and return its fresh identifier.
    ///
    /// The label is trimmed and the category normalised with
    /// [`normalise_category`]. A new category starts enabled.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyLabel`] for a blank label and
    /// [`RegistryError::NonFinitePosition`] for NaN or infinite coordinates.
    pub fn add(
        &mut self,
        position: Coord<f64>,
        label: &str,
        category: &str,
    ) -> Result<PointId, RegistryError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(RegistryError::EmptyLabel);
        }
        if !(position.x.is_finite() && position.y.is_finite()) {
            return Err(RegistryError::NonFinitePosition);
        }

        let category = normalise_category(category);
        self.next_id = self.next_id.saturating_add(1);
        let id = PointId::new(self.next_id);
        if self.categories.ensure(&category) {
            debug!("category {category:?} created by point {id}");
        }
        debug!("added point {id} {label:?} to {category:?}");
        self.points.insert(
            id,
            LocationPoint::new(id, position, label.to_owned(), category),
        );
        Ok(id)
    }

    /// Remove a point, pruning its category when it becomes empty.
    ///
    /// Returns the removed point, or `None` when `id` is unknown.
    pub fn remove(&mut self, id: PointId) -> Option<LocationPoint> {
        let removed = self.points.remove(&id)?;
        debug!("removed point {id}");
        self.prune_if_empty(&removed.category);
        Some(removed)
    }

    /// Move a point to another category.
    ///
    /// Creates the target category when needed and prunes the old one when it
    /// becomes empty. Returns `false` (and changes nothing) when `id` is
    /// unknown or the point already belongs to the target category.
    pub fn reassign_category(&mut self, id: PointId, category: &str) -> bool {
        let category = normalise_category(category);
        let Some(point) = self.points.get_mut(&id) else {
            return false;
        };
        if point.category == category {
            return false;
        }
        let previous = std::mem::replace(&mut point.category, category.clone());
        self.categories.ensure(&category);
        self.prune_if_empty(&previous);
        debug!("point {id} moved from {previous:?} to {category:?}");
        true
    }

    /// Enable or disable every point in `category`.
    ///
    /// Idempotent. Returns `true` when the flag changed; unknown categories
    /// are ignored.
    pub fn set_category_enabled(&mut self, category: &str, enabled: bool) -> bool {
        let changed = self
            .categories
            .set_enabled(&normalise_category(category), enabled);
        if changed {
            debug!("category {category:?} enabled={enabled}");
        }
        changed
    }

    /// Move a point to a new position. Returns `false` for unknown ids or
    /// non-finite coordinates.
    pub fn move_point(&mut self, id: PointId, position: Coord<f64>) -> bool {
        if !(position.x.is_finite() && position.y.is_finite()) {
            return false;
        }
        self.points.get_mut(&id).is_some_and(|point| {
            point.position = position;
            true
        })
    }

    /// Mark a point as having triggered its proximity alert.
    ///
    /// Returns `true` only on the first call for a given point.
    pub fn mark_notified(&mut self, id: PointId) -> bool {
        match self.points.get_mut(&id) {
            Some(point) if !point.notified => {
                point.notified = true;
                true
            }
            _ => false,
        }
    }

    /// Points whose category is enabled, in insertion order.
    pub fn visible_points(&self) -> impl Iterator<Item = &LocationPoint> {
        self.points
            .values()
            .filter(|point| self.categories.is_enabled(&point.category))
    }

    /// Every point in insertion order.
    pub fn points(&self) -> impl Iterator<Item = &LocationPoint> {
        self.points.values()
    }

    /// Look up a point.
    #[must_use]
    pub fn get(&self, id: PointId) -> Option<&LocationPoint> {
        self.points.get(&id)
    }

    /// Whether the point exists and its category is enabled.
    #[must_use]
    pub fn is_visible(&self, id: PointId) -> bool {
        self.points
            .get(&id)
            .is_some_and(|point| self.categories.is_enabled(&point.category))
    }

    /// The current category set.
    #[must_use]
    pub const fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Whether `category` exists and is enabled.
    #[must_use]
    pub fn is_category_enabled(&self, category: &str) -> bool {
        self.categories.is_enabled(&normalise_category(category))
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the registry holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Remove every point and non-default category.
    ///
    /// The identifier counter keeps counting so ids stay unique for the
    /// registry's lifetime.
    pub fn reset(&mut self) {
        debug!("resetting registry with {} points", self.points.len());
        self.points.clear();
        self.categories.clear();
    }

    /// Export every point for persistence, omitting ids and alert state.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SnapshotEntry> {
        self.points.values().map(SnapshotEntry::from).collect()
    }

    /// Re-add snapshot entries in order, assigning fresh ids.
    ///
    /// Entries that [`add`](Self::add) rejects are skipped and counted.
    pub fn restore<I>(&mut self, entries: I) -> RestoreSummary
    where
        I: IntoIterator<Item = SnapshotEntry>,
    {
        let mut summary = RestoreSummary::default();
        for entry in entries {
            match self.add(entry.position(), &entry.name, &entry.list_id) {
                Ok(id) => summary.restored.push(id),
                Err(err) => {
                    log::warn!("skipping snapshot entry {:?}: {err}", entry.name);
                    summary.skipped = summary.skipped.saturating_add(1);
                }
            }
        }
        summary
    }

    fn prune_if_empty(&mut self, category: &str) {
        let in_use = self.points.values().any(|point| point.category == category);
        if !in_use && self.categories.prune(category) {
            debug!("category {category:?} pruned");
        }
    }
}
