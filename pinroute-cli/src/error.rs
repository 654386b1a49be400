//! Error types emitted by the pinroute CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use pinroute_core::{RegistryError, RoutingError, SnapshotError};
use pinroute_data::routing::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the pinroute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without dashes.
        field: &'static str,
        /// Environment variable that also supplies it.
        env: &'static str,
    },
    /// An option was present but unusable.
    #[error("invalid {field}: {message}")]
    InvalidArgument {
        /// Flag name without dashes.
        field: &'static str,
        /// Why it was rejected.
        message: String,
    },
    /// The marker file does not exist.
    #[error("marker store {path:?} does not exist or is not a file")]
    MissingStore {
        /// Store path.
        path: Utf8PathBuf,
    },
    /// The marker file could not be inspected.
    #[error("failed to inspect marker store {path:?}: {source}")]
    InspectStore {
        /// Store path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Loading markers from the store failed.
    #[error("failed to load markers from {path:?}: {source}")]
    LoadMarkers {
        /// Store path.
        path: Utf8PathBuf,
        /// Underlying snapshot error.
        #[source]
        source: SnapshotError,
    },
    /// Saving markers to the store failed.
    #[error("failed to save markers to {path:?}: {source}")]
    SaveMarkers {
        /// Store path.
        path: Utf8PathBuf,
        /// Underlying snapshot error.
        #[source]
        source: SnapshotError,
    },
    /// The marker was rejected by the registry.
    #[error("cannot add marker: {0}")]
    InvalidMarker(#[from] RegistryError),
    /// No marker has the given id.
    #[error("no marker with id {id} (see `pinroute list`)")]
    UnknownMarker {
        /// Requested id.
        id: u64,
    },
    /// The session refused to draw a route.
    #[error("cannot draw route: {message}")]
    RouteRejected {
        /// User-facing explanation.
        message: String,
    },
    /// Constructing the routing provider failed.
    #[error("failed to build routing provider for {base_url:?}: {source}")]
    BuildRoutingProvider {
        /// Configured base URL.
        base_url: String,
        /// Underlying build error.
        #[source]
        source: ProviderBuildError,
    },
    /// The routing service failed.
    #[error("routing failed: {0}")]
    Routing(#[source] RoutingError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
