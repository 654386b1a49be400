//! One-shot proximity alerts for location points.

use geo::Coord;
use log::debug;

use crate::distance::{DistanceMetric, HaversineMetric};
use crate::point::PointId;
use crate::registry::MarkerRegistry;

/// Alert radius used by the browser build, in metres.
pub const DEFAULT_PROXIMITY_RADIUS_M: f64 = 100.0;

/// The user came within range of a point for the first time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProximityAlert {
    /// Point that triggered the alert.
    pub id: PointId,
    /// The point's label at the time of the alert.
    pub label: String,
}

/// Fires a single alert per point when a position fix lands within the
/// radius.
///
/// Every point is checked, visible or not. Points already marked as notified
/// are skipped and never alert again.
#[derive(Debug, Clone)]
pub struct ProximityMonitor<M = HaversineMetric> {
    metric: M,
    radius_m: f64,
}

impl Default for ProximityMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_PROXIMITY_RADIUS_M)
    }
}

impl ProximityMonitor {
    /// Construct a haversine monitor with the given radius in metres.
    #[must_use]
    pub const fn new(radius_m: f64) -> Self {
        Self::with_metric(HaversineMetric, radius_m)
    }
}

impl<M> ProximityMonitor<M>
where
    M: DistanceMetric,
{
    /// Construct a monitor with an explicit metric.
    pub const fn with_metric(metric: M, radius_m: f64) -> Self {
        Self { metric, radius_m }
    }

    /// Alert radius in metres.
    pub const fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Check `here` against every un-notified point, marking those in range.
    ///
    /// Distances strictly below the radius count as in range.
    ///
    /// # Examples
    /// ```
    /// use pinroute_core::{MarkerRegistry, ProximityMonitor, lat_lng};
    ///
    /// # fn main() -> Result<(), pinroute_core::RegistryError> {
    /// let mut registry = MarkerRegistry::new();
    /// registry.add(lat_lng(37.0, -122.0), "Blue Door", "cafe")?;
    /// let monitor = ProximityMonitor::default();
    ///
    /// let here = lat_lng(37.0003, -122.0);
    /// assert_eq!(monitor.check(&mut registry, here).len(), 1);
    /// assert!(monitor.check(&mut registry, here).is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn check(&self, registry: &mut MarkerRegistry, here: Coord<f64>) -> Vec<ProximityAlert> {
        let in_range: Vec<ProximityAlert> = registry
            .points()
            .filter(|point| !point.notified())
            .filter(|point| self.metric.distance_m(here, point.position()) < self.radius_m)
            .map(|point| ProximityAlert {
                id: point.id(),
                label: point.label().to_owned(),
            })
            .collect();

        in_range
            .into_iter()
            .filter(|alert| registry.mark_notified(alert.id))
            .inspect(|alert| debug!("user is near point {} {:?}", alert.id, alert.label))
            .collect()
    }
}
