//! HTTP routing provider for OSRM.
//!
//! [`OsrmRoutingProvider`] implements [`pinroute_core::RoutingProvider`] by
//! calling the OSRM Route API with the ordered stops and returning the best
//! route's GeoJSON geometry, distance and duration.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use pinroute_core::{RouteRequest, RoutingProvider, TravelMode, lat_lng};
//! use pinroute_data::routing::{OsrmRoutingProvider, OsrmRoutingProviderConfig};
//!
//! let config = OsrmRoutingProviderConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("my-app/1.0");
//! let provider = OsrmRoutingProvider::with_config(config)?;
//!
//! let request = RouteRequest {
//!     start: lat_lng(51.5, -0.1),
//!     stops: vec![lat_lng(51.6, -0.2)],
//!     mode: TravelMode::Car,
//! };
//! let geometry = provider.route(&request)?;
//! println!("{} m in {:?}", geometry.distance_m, geometry.duration);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod osrm;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, OsrmRoutingProvider,
    OsrmRoutingProviderConfig, ProviderBuildError, osrm_profile,
};
