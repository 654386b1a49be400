//! Deterministic collaborators used by unit and behaviour tests.
//!
//! Gated behind the `test-support` feature (and `cfg(test)`).

use std::cell::RefCell;
use std::time::Duration;

use geo::Coord;

use crate::distance::DistanceMetric;
use crate::routing::{RouteGeometry, RouteRequest, RoutingError, RoutingProvider};

/// Euclidean distance over raw degrees.
///
/// Makes ordering easy to reason about in tests: points along the equator
/// are exactly their longitude difference apart.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlatMetric;

impl DistanceMetric for FlatMetric {
    fn distance_m(&self, from: Coord<f64>, to: Coord<f64>) -> f64 {
        (from.x - to.x).hypot(from.y - to.y)
    }
}

/// `RoutingProvider` that joins waypoints with straight lines and keeps every
/// request it sees.
#[derive(Debug, Default)]
pub struct RecordingRoutingProvider {
    requests: RefCell<Vec<RouteRequest>>,
    failure: Option<RoutingError>,
}

impl RecordingRoutingProvider {
    /// A provider that fails every request with `error`.
    pub fn failing(error: RoutingError) -> Self {
        Self {
            requests: RefCell::default(),
            failure: Some(error),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.borrow().clone()
    }
}

impl RoutingProvider for RecordingRoutingProvider {
    fn route(&self, request: &RouteRequest) -> Result<RouteGeometry, RoutingError> {
        self.requests.borrow_mut().push(request.clone());
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        if request.stops.is_empty() {
            return Err(RoutingError::EmptyInput);
        }
        let coordinates: Vec<Coord<f64>> = request.waypoints().collect();
        let distance_m = coordinates
            .windows(2)
            .map(|pair| match pair {
                [from, to] => FlatMetric.distance_m(*from, *to),
                _ => 0.0,
            })
            .sum();
        Ok(RouteGeometry {
            coordinates,
            distance_m,
            duration: Duration::from_secs(60),
        })
    }
}
