//! Facade crate for the pinroute marker planner.
//!
//! This crate re-exports the core domain types and, behind the `data`
//! feature, the file-backed store and OSRM routing provider.

#![forbid(unsafe_code)]

pub use pinroute_core::{
    Category, CategorySet, DEFAULT_CATEGORY, DEFAULT_MAX_STOPS, DEFAULT_PROXIMITY_RADIUS_M,
    DEFAULT_STORAGE_KEY, DistanceMetric, Effect, Event, GEOCODE_ZOOM, GeocodeHit,
    HaversineMetric, InputRejection, KeyValueStore, LocationPoint, MarkerRegistry,
    MemoryKeyValueStore, Notice, ParseTravelModeError, PlannerConfig, PointId, ProximityAlert,
    ProximityMonitor, RegistryError, RestoreSummary, RouteGeometry, RoutePlan, RoutePlanner,
    RouteRequest, RouteTicket, RouteTruncated, RoutingError, RoutingProvider, Session,
    SessionConfig, SnapshotEntry, SnapshotError, StoreError, TravelMode, lat_lng,
    normalise_category,
};

#[cfg(feature = "serde")]
pub use pinroute_core::{load_registry, save_registry};

#[cfg(feature = "data")]
pub use pinroute_data::FileKeyValueStore;

#[cfg(feature = "data")]
pub use pinroute_data::routing::{OsrmRoutingProvider, OsrmRoutingProviderConfig};
