//! Command-line interface for the pinroute marker planner.
//!
//! Markers live in a JSON key-value file (`--store`, default
//! `pinroute.json`) under a single key (`--key`, default `myMarkers`), so the
//! same snapshot format is shared with any other embedder of
//! `pinroute-core`.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use pinroute_core::DEFAULT_STORAGE_KEY;

mod error;
mod markers;
mod route;

pub use error::CliError;

use markers::{AddArgs, NearArgs, ReassignArgs, RemoveArgs};
use route::{DefaultRouteProviderBuilder, RouteArgs, RouteProviderBuilder};

pub(crate) const ARG_ROUTE_LAT: &str = "lat";
pub(crate) const ARG_ROUTE_LNG: &str = "lng";
pub(crate) const ARG_ROUTE_MODE: &str = "mode";
pub(crate) const ARG_ROUTE_HIDE: &str = "hide";
pub(crate) const ARG_ROUTE_MAX_STOPS: &str = "max-stops";
pub(crate) const ARG_ROUTE_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_ROUTE_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ENV_ROUTE_LAT: &str = "PINROUTE_CMDS_ROUTE_LAT";
pub(crate) const ENV_ROUTE_LNG: &str = "PINROUTE_CMDS_ROUTE_LNG";

const DEFAULT_STORE_PATH: &str = "pinroute.json";

/// Run the pinroute CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_with(cli, &DefaultRouteProviderBuilder, &mut stdout)
}

fn run_with(
    cli: Cli,
    builder: &dyn RouteProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = StoreLocation {
        path: cli.store,
        key: cli.key,
    };
    match cli.command {
        Command::Add(args) => markers::run_add(&store, args, writer),
        Command::Remove(args) => markers::run_remove(&store, args, writer),
        Command::Reassign(args) => markers::run_reassign(&store, args, writer),
        Command::List => markers::run_list(&store, writer),
        Command::Near(args) => markers::run_near(&store, args, writer),
        Command::Route(args) => route::run_route_with(&store, args, builder, writer),
    }
}

/// Where the marker snapshot is read from and written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoreLocation {
    pub(crate) path: Utf8PathBuf,
    pub(crate) key: String,
}

#[derive(Debug, Parser)]
#[command(
    name = "pinroute",
    about = "Keep categorised map markers and plan nearest-first routes through them",
    version
)]
struct Cli {
    /// JSON file holding the marker snapshot.
    #[arg(long, global = true, value_name = "path", default_value = DEFAULT_STORE_PATH)]
    store: Utf8PathBuf,
    /// Key the snapshot is stored under.
    #[arg(long, global = true, value_name = "key", default_value = DEFAULT_STORAGE_KEY)]
    key: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a marker.
    Add(AddArgs),
    /// Delete a marker by id.
    Remove(RemoveArgs),
    /// Move a marker to another category.
    Reassign(ReassignArgs),
    /// List markers and categories.
    List,
    /// Report markers within a radius of a position.
    Near(NearArgs),
    /// Order the visible markers nearest-first and fetch a road route.
    Route(RouteArgs),
}

/// Pretty-print `value` as JSON followed by a newline.
pub(crate) fn write_json<T>(writer: &mut dyn Write, value: &T) -> Result<(), CliError>
where
    T: serde::Serialize + ?Sized,
{
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
