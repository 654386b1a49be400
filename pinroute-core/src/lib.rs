//! Core domain for the pinroute marker planner.
//!
//! Users drop named location points on a map, sort them into toggleable
//! categories, get a one-shot alert when they wander near one, and ask for a
//! route visiting the visible points nearest-first. This crate holds the
//! state and the algorithms; rendering, geolocation, geocoding and road
//! routing are collaborators supplied by the embedder.
//!
//! [`Session`] is the usual entry point. It owns a [`MarkerRegistry`] and
//! turns UI [`Event`]s into [`Effect`]s.

#![forbid(unsafe_code)]

mod category;
mod distance;
mod planner;
mod point;
mod proximity;
mod registry;
mod routing;
mod session;
mod snapshot;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use category::{Category, CategorySet, DEFAULT_CATEGORY, normalise_category};
pub use distance::{DistanceMetric, HaversineMetric};
pub use planner::{
    DEFAULT_MAX_STOPS, ParseTravelModeError, PlannerConfig, RoutePlan, RoutePlanner,
    RouteTruncated, TravelMode,
};
pub use point::{LocationPoint, PointId, lat_lng};
pub use proximity::{DEFAULT_PROXIMITY_RADIUS_M, ProximityAlert, ProximityMonitor};
pub use registry::{MarkerRegistry, RegistryError};
pub use routing::{RouteGeometry, RouteRequest, RoutingError, RoutingProvider};
pub use session::{
    Effect, Event, GEOCODE_ZOOM, GeocodeHit, InputRejection, Notice, RouteTicket, Session,
    SessionConfig,
};
#[cfg(feature = "serde")]
pub use snapshot::{load_registry, save_registry};
pub use snapshot::{
    DEFAULT_STORAGE_KEY, KeyValueStore, MemoryKeyValueStore, RestoreSummary, SnapshotEntry,
    SnapshotError, StoreError,
};
