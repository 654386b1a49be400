//! Route command implementation for the pinroute CLI.

use std::io::Write;
use std::time::Duration;

use camino::Utf8Path;
use clap::Parser;
use log::{debug, info};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pinroute_core::{
    DEFAULT_MAX_STOPS, Effect, Event, HaversineMetric, MarkerRegistry, Notice, PlannerConfig,
    RouteGeometry, RoutingProvider, Session, SessionConfig, TravelMode, lat_lng,
};
use pinroute_data::routing::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, OsrmRoutingProvider, OsrmRoutingProviderConfig,
};
use serde::{Deserialize, Serialize};

use crate::markers::load_markers;
use crate::{
    ARG_ROUTE_HIDE, ARG_ROUTE_LAT, ARG_ROUTE_LNG, ARG_ROUTE_MAX_STOPS, ARG_ROUTE_MODE,
    ARG_ROUTE_OSRM_BASE_URL, ARG_ROUTE_TIMEOUT_SECS, CliError, ENV_ROUTE_LAT, ENV_ROUTE_LNG,
    StoreLocation, write_json,
};

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Order the visible markers nearest-first from a starting \
                 position and ask an OSRM instance for the road geometry. \
                 The start position, travel mode and routing service can come \
                 from CLI flags, configuration files, or environment \
                 variables.",
    about = "Plan a nearest-first route through the visible markers"
)]
#[ortho_config(prefix = "PINROUTE")]
pub(crate) struct RouteArgs {
    /// Starting latitude in degrees.
    #[arg(long = ARG_ROUTE_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Starting longitude in degrees.
    #[arg(long = ARG_ROUTE_LNG, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Travel mode: "walk" or "car" (default).
    #[arg(long = ARG_ROUTE_MODE, value_name = "mode")]
    #[serde(default)]
    pub(crate) mode: Option<String>,
    /// Categories to hide before planning, comma separated.
    #[arg(long = ARG_ROUTE_HIDE, value_name = "category", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) hide: Option<Vec<String>>,
    /// Most stops handed to the routing service.
    #[arg(long = ARG_ROUTE_MAX_STOPS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_stops: Option<usize>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_ROUTE_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Routing request timeout in seconds.
    #[arg(long = ARG_ROUTE_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RouteConfig {
    pub(crate) lat: f64,
    pub(crate) lng: f64,
    pub(crate) mode: TravelMode,
    pub(crate) hide: Vec<String>,
    pub(crate) max_stops: usize,
    pub(crate) osrm_base_url: String,
    pub(crate) timeout: Duration,
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_ROUTE_LAT,
            env: ENV_ROUTE_LAT,
        })?;
        let lng = args.lng.ok_or(CliError::MissingArgument {
            field: ARG_ROUTE_LNG,
            env: ENV_ROUTE_LNG,
        })?;
        if !(lat.is_finite() && lng.is_finite()) {
            return Err(CliError::InvalidArgument {
                field: ARG_ROUTE_LAT,
                message: format!("({lat}, {lng}) is not a finite position"),
            });
        }

        let mode = match args.mode {
            Some(raw) => raw
                .parse::<TravelMode>()
                .map_err(|err| CliError::InvalidArgument {
                    field: ARG_ROUTE_MODE,
                    message: err.to_string(),
                })?,
            None => TravelMode::default(),
        };

        let max_stops = args.max_stops.unwrap_or(DEFAULT_MAX_STOPS);
        if max_stops == 0 {
            return Err(CliError::InvalidArgument {
                field: ARG_ROUTE_MAX_STOPS,
                message: "a route needs at least one stop".to_owned(),
            });
        }

        Ok(Self {
            lat,
            lng,
            mode,
            hide: args.hide.unwrap_or_default(),
            max_stops,
            osrm_base_url: args
                .osrm_base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

/// Builds the routing provider for the current route invocation.
pub(crate) trait RouteProviderBuilder {
    fn build(&self, config: &RouteConfig) -> Result<Box<dyn RoutingProvider>, CliError>;
}

pub(crate) struct DefaultRouteProviderBuilder;

impl RouteProviderBuilder for DefaultRouteProviderBuilder {
    fn build(&self, config: &RouteConfig) -> Result<Box<dyn RoutingProvider>, CliError> {
        let provider_config = OsrmRoutingProviderConfig::new(config.osrm_base_url.clone())
            .with_timeout(config.timeout);
        let provider = OsrmRoutingProvider::with_config(provider_config).map_err(|source| {
            CliError::BuildRoutingProvider {
                base_url: config.osrm_base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(provider))
    }
}

/// A stop on the printed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StopView {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) lat: f64,
    pub(crate) lng: f64,
}

/// Cap report on the printed route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TruncationView {
    pub(crate) requested: usize,
    pub(crate) kept: usize,
}

/// Output of `pinroute route`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RouteOutput {
    pub(crate) mode: String,
    pub(crate) stops: Vec<StopView>,
    pub(crate) truncated: Option<TruncationView>,
    pub(crate) distance_m: f64,
    pub(crate) duration_secs: f64,
    /// Route shape as `[lat, lng]` pairs.
    pub(crate) path: Vec<[f64; 2]>,
    pub(crate) notices: Vec<String>,
}

pub(crate) fn run_route_with(
    store: &StoreLocation,
    args: RouteArgs,
    builder: &dyn RouteProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_store(&store.path)?;
    let registry = load_markers(store)?;
    let provider = builder.build(&config)?;
    let output = plan_route(registry, &config, provider.as_ref())?;
    info!(
        "routed {} stops over {:.0} m",
        output.stops.len(),
        output.distance_m
    );
    write_json(writer, &output)
}

fn require_store(path: &Utf8Path) -> Result<(), CliError> {
    match pinroute_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingStore {
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingStore {
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectStore {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Drive a session through fix, category toggles and a draw request.
pub(crate) fn plan_route(
    registry: MarkerRegistry,
    config: &RouteConfig,
    provider: &dyn RoutingProvider,
) -> Result<RouteOutput, CliError> {
    let session_config = SessionConfig {
        planner: PlannerConfig {
            max_stops: config.max_stops,
        },
        ..SessionConfig::default()
    };
    let mut session = Session::with_registry(registry, HaversineMetric, session_config);

    let mut effects = session.handle(Event::PositionUpdated(lat_lng(config.lat, config.lng)));
    for category in &config.hide {
        debug!("hiding category {category:?}");
        effects.extend(session.handle(Event::CategoryToggled {
            category: category.clone(),
            enabled: false,
        }));
    }
    effects.extend(session.handle_with(Event::DrawRouteRequested { mode: config.mode }, provider));

    let stops = session
        .route_stops()
        .iter()
        .filter_map(|id| session.registry().get(*id))
        .map(|point| StopView {
            id: point.id().get(),
            name: point.label().to_owned(),
            lat: point.position().y,
            lng: point.position().x,
        })
        .collect();
    collect_output(config.mode, stops, effects)
}

/// Fold the session's effects into the printed route.
///
/// `handle_with` has already resolved the routing request, so only the shown
/// geometry and notices are expected here.
fn collect_output(
    mode: TravelMode,
    stops: Vec<StopView>,
    effects: Vec<Effect>,
) -> Result<RouteOutput, CliError> {
    let mut geometry: Option<RouteGeometry> = None;
    let mut truncated = None;
    let mut notices = Vec::new();

    for effect in effects {
        match effect {
            Effect::ShowRoute { geometry: shown, .. } => geometry = Some(shown),
            Effect::Notify(Notice::RoutingFailed(err)) => return Err(CliError::Routing(err)),
            Effect::Notify(notice @ (Notice::InputRejected(_) | Notice::LocationUnavailable)) => {
                return Err(CliError::RouteRejected {
                    message: notice.to_string(),
                });
            }
            Effect::Notify(notice) => {
                if let Notice::RouteTruncated(cap) = &notice {
                    truncated = Some(TruncationView {
                        requested: cap.requested,
                        kept: cap.kept,
                    });
                }
                notices.push(notice.to_string());
            }
            _ => {}
        }
    }

    let Some(geometry) = geometry else {
        return Err(CliError::RouteRejected {
            message: "no route was produced".to_owned(),
        });
    };

    Ok(RouteOutput {
        mode: mode.as_str().to_owned(),
        stops,
        truncated,
        distance_m: geometry.distance_m,
        duration_secs: geometry.duration.as_secs_f64(),
        path: geometry
            .coordinates
            .iter()
            .map(|coord| [coord.y, coord.x])
            .collect(),
        notices,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RouteConfig, CliError> {
    let merged = RouteArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RouteConfig::try_from(merged)
}
