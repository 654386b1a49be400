//! Adapters connecting the pinroute core to the outside world.
//!
//! Responsibilities:
//! - Implement [`pinroute_core::RoutingProvider`] over the OSRM HTTP API.
//! - Implement [`pinroute_core::KeyValueStore`] over a local JSON file.
//!
//! Boundaries:
//! - Do not encode domain rules (those live in `pinroute-core`).
//! - Keep blocking I/O off async executors; the HTTP provider owns its own
//!   runtime.
//!
//! Invariants:
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod routing;
mod store;

pub use store::FileKeyValueStore;
