//! Test utilities for routing providers.
//!
//! [`StubRoutingProvider`] returns a pre-configured reply without making
//! HTTP requests.

use std::time::Duration;

use pinroute_core::{RouteGeometry, RouteRequest, RoutingError, RoutingProvider};

/// Stub `RoutingProvider` for testing.
///
/// # Example
///
/// ```
/// use pinroute_core::{RouteRequest, RoutingProvider, TravelMode, lat_lng};
/// use pinroute_data::routing::test_support::StubRoutingProvider;
///
/// let provider = StubRoutingProvider::straight_lines();
/// let request = RouteRequest {
///     start: lat_lng(0.0, 0.0),
///     stops: vec![lat_lng(0.0, 1.0)],
///     mode: TravelMode::Car,
/// };
///
/// let geometry = provider.route(&request).expect("stub routes");
/// assert_eq!(geometry.coordinates.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct StubRoutingProvider {
    response: StubResponse,
}

#[derive(Debug, Clone)]
enum StubResponse {
    StraightLines,
    Geometry(RouteGeometry),
    Error(RoutingError),
}

impl StubRoutingProvider {
    /// A provider that joins the request's waypoints in order, reporting zero
    /// distance and one minute per leg.
    #[must_use]
    pub const fn straight_lines() -> Self {
        Self {
            response: StubResponse::StraightLines,
        }
    }

    /// A provider that returns `geometry` for any non-empty request.
    #[must_use]
    pub const fn with_geometry(geometry: RouteGeometry) -> Self {
        Self {
            response: StubResponse::Geometry(geometry),
        }
    }

    /// A provider that fails every non-empty request with `error`.
    ///
    /// Empty input still returns `RoutingError::EmptyInput`.
    #[must_use]
    pub const fn with_error(error: RoutingError) -> Self {
        Self {
            response: StubResponse::Error(error),
        }
    }
}

impl RoutingProvider for StubRoutingProvider {
    fn route(&self, request: &RouteRequest) -> Result<RouteGeometry, RoutingError> {
        if request.stops.is_empty() {
            return Err(RoutingError::EmptyInput);
        }

        match &self.response {
            StubResponse::StraightLines => {
                let legs = u32::try_from(request.stops.len()).unwrap_or(u32::MAX);
                Ok(RouteGeometry {
                    coordinates: request.waypoints().collect(),
                    distance_m: 0.0,
                    duration: Duration::from_secs(60).saturating_mul(legs),
                })
            }
            StubResponse::Geometry(geometry) => Ok(geometry.clone()),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}
