//! Location points placed by the user or by search.
//!
//! Coordinates are WGS84 with `x = longitude` and `y = latitude`, matching the
//! rest of the `geo` ecosystem.

use std::fmt;

use geo::Coord;

/// Opaque identifier for a [`LocationPoint`].
///
/// Identifiers are handed out by [`MarkerRegistry`](crate::MarkerRegistry)
/// and are never reused for the lifetime of that registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(u64);

impl PointId {
    /// Wrap a raw identifier.
    ///
    /// # Examples
    /// ```
    /// use pinroute_core::PointId;
    ///
    /// let id = PointId::new(7);
    /// assert_eq!(id.get(), 7);
    /// ```
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build a coordinate from a latitude/longitude pair in degrees.
///
/// # Examples
/// ```
/// use pinroute_core::lat_lng;
///
/// let here = lat_lng(37.7749, -122.4194);
/// assert_eq!(here.y, 37.7749);
/// assert_eq!(here.x, -122.4194);
/// ```
#[must_use]
pub const fn lat_lng(lat: f64, lng: f64) -> Coord<f64> {
    Coord { x: lng, y: lat }
}

/// A single point of interest on the map.
///
/// The label is kept as structured data; anything shown on a map surface is a
/// projection of these fields and is never parsed back.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPoint {
    pub(crate) id: PointId,
    pub(crate) position: Coord<f64>,
    pub(crate) label: String,
    pub(crate) category: String,
    pub(crate) notified: bool,
}

impl LocationPoint {
    pub(crate) const fn new(
        id: PointId,
        position: Coord<f64>,
        label: String,
        category: String,
    ) -> Self {
        Self {
            id,
            position,
            label,
            category,
            notified: false,
        }
    }

    /// Identifier assigned at creation.
    #[must_use]
    pub const fn id(&self) -> PointId {
        self.id
    }

    /// Geospatial position.
    #[must_use]
    pub const fn position(&self) -> Coord<f64> {
        self.position
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.position.y
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.position.x
    }

    /// User-supplied name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Name of the category the point belongs to.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether a proximity alert has already fired for this point.
    #[must_use]
    pub const fn notified(&self) -> bool {
        self.notified
    }
}
