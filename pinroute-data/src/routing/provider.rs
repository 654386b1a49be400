//! HTTP-based `RoutingProvider` using OSRM's Route API.
//!
//! The [`RoutingProvider`] trait is synchronous so the session can stay a
//! plain single-threaded dispatcher. This provider bridges the async HTTP
//! call to the sync interface by blocking on a Tokio runtime internally.
//!
//! # Example
//!
//! ```no_run
//! use pinroute_core::{RouteRequest, RoutingProvider, TravelMode, lat_lng};
//! use pinroute_data::routing::OsrmRoutingProvider;
//!
//! let provider = OsrmRoutingProvider::new("http://localhost:5000")?;
//! let request = RouteRequest {
//!     start: lat_lng(37.0, -122.0),
//!     stops: vec![lat_lng(37.001, -122.0)],
//!     mode: TravelMode::Walk,
//! };
//!
//! let geometry = provider.route(&request)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use geo::Coord;
use log::debug;
use pinroute_core::{RouteGeometry, RouteRequest, RoutingError, RoutingProvider, TravelMode};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::osrm::RouteResponse;

/// Error type for [`OsrmRoutingProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The base URL is not an absolute HTTP(S) URL.
    #[error("invalid routing base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// URL as supplied.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Public OSRM demo server.
pub const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "pinroute/0.1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`OsrmRoutingProvider`].
#[derive(Debug, Clone)]
pub struct OsrmRoutingProviderConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OsrmRoutingProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OsrmRoutingProviderConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// OSRM profile name for a travel mode.
#[must_use]
pub const fn osrm_profile(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walk => "foot",
        TravelMode::Car => "car",
    }
}

/// HTTP routing provider backed by the OSRM Route API.
///
/// The provider owns a current-thread Tokio runtime reused across calls.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the provider blocks on its own runtime. Inside
/// a multi-threaded runtime it uses the caller's handle with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it
/// falls back to its own runtime, which can deadlock if the caller's
/// runtime drives IO this request depends on.
pub struct OsrmRoutingProvider {
    client: Client,
    config: OsrmRoutingProviderConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OsrmRoutingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmRoutingProvider")
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl OsrmRoutingProvider {
    /// Create a provider for `base_url` with default timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmRoutingProviderConfig::new(base_url))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: OsrmRoutingProviderConfig) -> Result<Self, ProviderBuildError> {
        validate_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The provider configuration.
    #[must_use]
    pub const fn config(&self) -> &OsrmRoutingProviderConfig {
        &self.config
    }

    /// Build the Route API URL for `request`.
    ///
    /// The URL format is
    /// `{base_url}/route/v1/{profile}/{coordinates}?overview=full&geometries=geojson`
    /// where coordinates are semicolon-separated `lng,lat` pairs, start first.
    fn build_route_url(&self, request: &RouteRequest) -> String {
        let coords = request
            .waypoints()
            .map(|coord| format!("{},{}", coord.x, coord.y))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            osrm_profile(request.mode),
            coords
        )
    }

    async fn fetch_route_async(
        &self,
        request: &RouteRequest,
    ) -> Result<RouteGeometry, RoutingError> {
        let url = self.build_route_url(request);
        debug!("requesting route from {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let route_response: RouteResponse =
            response
                .json()
                .await
                .map_err(|err| RoutingError::ParseError {
                    message: err.to_string(),
                })?;

        Self::convert_response(route_response)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> RoutingError {
        if error.is_timeout() {
            return RoutingError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return RoutingError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        RoutingError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Take the best route from an OSRM response.
    fn convert_response(response: RouteResponse) -> Result<RouteGeometry, RoutingError> {
        if !response.is_ok() {
            return Err(RoutingError::ServiceError {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::ParseError {
                message: "OSRM response contained no routes".to_owned(),
            })?;

        let duration = Some(route.duration)
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
            .ok_or_else(|| RoutingError::ParseError {
                message: format!("invalid route duration {}", route.duration),
            })?;

        let coordinates = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| Coord { x: lng, y: lat })
            .collect();

        Ok(RouteGeometry {
            coordinates,
            distance_m: route.distance,
            duration,
        })
    }
}

impl RoutingProvider for OsrmRoutingProvider {
    /// Fetch route geometry through every stop in order.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime should
    /// be multi-threaded; see the type-level documentation.
    fn route(&self, request: &RouteRequest) -> Result<RouteGeometry, RoutingError> {
        if request.stops.is_empty() {
            return Err(RoutingError::EmptyInput);
        }

        let future = self.fetch_route_async(request);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // No runtime detected, or current_thread runtime: use our own runtime.
            _ => self.runtime.block_on(future),
        }
    }
}

fn validate_base_url(base_url: &str) -> Result<(), ProviderBuildError> {
    let invalid = |reason: String| ProviderBuildError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason,
    };
    let parsed = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}
