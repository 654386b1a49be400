//! OSRM Route service response types.
//!
//! Only the fields the provider reads are modelled. Requests ask for
//! `geometries=geojson`, so each route carries a GeoJSON `LineString`.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the coordinates
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// One route through every requested waypoint.
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Distance in metres.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Route shape.
    pub geometry: LineString,
}

/// GeoJSON `LineString` with `[lng, lat]` positions.
#[derive(Debug, Deserialize)]
pub struct LineString {
    /// Positions in travel order.
    pub coordinates: Vec<[f64; 2]>,
}
