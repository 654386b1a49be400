//! Boundary to the external routing collaborator.
//!
//! The [`RoutingProvider`] trait turns an ordered stop list into travel
//! geometry. It is synchronous so the core stays embeddable in synchronous
//! contexts; HTTP-backed implementations block on their own runtime.

use std::time::Duration;

use geo::Coord;
use thiserror::Error;

use crate::planner::{RoutePlan, TravelMode};

/// Input handed verbatim to a [`RoutingProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Where the route begins.
    pub start: Coord<f64>,
    /// Stops in visiting order.
    pub stops: Vec<Coord<f64>>,
    /// Travel mode.
    pub mode: TravelMode,
}

impl RouteRequest {
    /// Every waypoint including the start, in visiting order.
    pub fn waypoints(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        std::iter::once(self.start).chain(self.stops.iter().copied())
    }
}

impl From<RoutePlan> for RouteRequest {
    fn from(plan: RoutePlan) -> Self {
        Self {
            start: plan.start,
            stops: plan.stops,
            mode: plan.mode,
        }
    }
}

/// Travel geometry returned by a routing service.
///
/// The core treats the geometry as opaque and only passes it to the map
/// surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    /// Polyline coordinates in travel order.
    pub coordinates: Vec<Coord<f64>>,
    /// Total distance in metres.
    pub distance_m: f64,
    /// Estimated travel time.
    pub duration: Duration,
}

/// Errors from [`RoutingProvider::route`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The request contained no stops.
    #[error("a route needs at least one stop")]
    EmptyInput,
    /// The request exceeded the configured timeout.
    #[error("routing request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("routing service at {url} returned HTTP {status}: {message}")]
    HttpError {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The service could not be reached.
    #[error("could not reach routing service at {url}: {message}")]
    NetworkError {
        /// Request URL.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The service reported an application-level error.
    #[error("routing service error {code}: {message}")]
    ServiceError {
        /// Service status code, e.g. `NoRoute`.
        code: String,
        /// Error detail.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Error detail.
        message: String,
    },
}

/// Convert ordered stops into travel geometry.
///
/// Implementations should return [`RoutingError::EmptyInput`] when
/// `request.stops` is empty rather than calling out to a service.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use pinroute_core::{
///     RouteGeometry, RouteRequest, RoutingError, RoutingProvider, TravelMode, lat_lng,
/// };
///
/// struct StraightLines;
///
/// impl RoutingProvider for StraightLines {
///     fn route(&self, request: &RouteRequest) -> Result<RouteGeometry, RoutingError> {
///         if request.stops.is_empty() {
///             return Err(RoutingError::EmptyInput);
///         }
///         Ok(RouteGeometry {
///             coordinates: request.waypoints().collect(),
///             distance_m: 0.0,
///             duration: Duration::ZERO,
///         })
///     }
/// }
///
/// let request = RouteRequest {
///     start: lat_lng(0.0, 0.0),
///     stops: vec![lat_lng(0.0, 1.0)],
///     mode: TravelMode::Car,
/// };
/// let geometry = StraightLines.route(&request)?;
/// assert_eq!(geometry.coordinates.len(), 2);
/// # Ok::<(), RoutingError>(())
/// ```
pub trait RoutingProvider {
    /// Compute travel geometry for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError`] when the service fails, times out or cannot
    /// route between the stops.
    fn route(&self, request: &RouteRequest) -> Result<RouteGeometry, RoutingError>;
}

impl<P> RoutingProvider for &P
where
    P: RoutingProvider + ?Sized,
{
    fn route(&self, request: &RouteRequest) -> Result<RouteGeometry, RoutingError> {
        (**self).route(request)
    }
}
