//! Marker bookkeeping commands: `add`, `remove`, `reassign`, `list` and
//! `near`.
//!
//! Each invocation restores the registry from the store, applies one change
//! and writes the snapshot back. Ids are assigned on restore, so they follow
//! snapshot order and shift after a removal.

use std::io::Write;

use clap::Args;
use log::{debug, info};
use pinroute_core::{
    DEFAULT_PROXIMITY_RADIUS_M, DistanceMetric, HaversineMetric, LocationPoint, MarkerRegistry,
    PointId, ProximityMonitor, lat_lng, load_registry, save_registry,
};
use pinroute_data::FileKeyValueStore;
use serde::{Deserialize, Serialize};

use crate::{CliError, StoreLocation, write_json};

/// Arguments for `pinroute add`.
#[derive(Debug, Clone, Args)]
pub(crate) struct AddArgs {
    /// Latitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lat: f64,
    /// Longitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lng: f64,
    /// Marker name.
    #[arg(long)]
    pub(crate) name: String,
    /// Category; blank selects the default category.
    #[arg(long, default_value = "")]
    pub(crate) category: String,
}

/// Arguments for `pinroute remove`.
#[derive(Debug, Clone, Args)]
pub(crate) struct RemoveArgs {
    /// Marker id as shown by `pinroute list`.
    pub(crate) id: u64,
}

/// Arguments for `pinroute reassign`.
#[derive(Debug, Clone, Args)]
pub(crate) struct ReassignArgs {
    /// Marker id as shown by `pinroute list`.
    pub(crate) id: u64,
    /// Target category.
    #[arg(long)]
    pub(crate) category: String,
}

/// Arguments for `pinroute near`.
#[derive(Debug, Clone, Args)]
pub(crate) struct NearArgs {
    /// Latitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lat: f64,
    /// Longitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lng: f64,
    /// Radius in metres; markers strictly closer are reported.
    #[arg(long, default_value_t = DEFAULT_PROXIMITY_RADIUS_M)]
    pub(crate) radius: f64,
}

/// One marker as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct MarkerView {
    pub(crate) id: u64,
    pub(crate) lat: f64,
    pub(crate) lng: f64,
    pub(crate) name: String,
    pub(crate) category: String,
    pub(crate) visible: bool,
}

impl MarkerView {
    fn new(registry: &MarkerRegistry, point: &LocationPoint) -> Self {
        Self {
            id: point.id().get(),
            lat: point.lat(),
            lng: point.lng(),
            name: point.label().to_owned(),
            category: point.category().to_owned(),
            visible: registry.is_visible(point.id()),
        }
    }
}

/// A category as printed by `pinroute list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CategoryView {
    pub(crate) name: String,
    pub(crate) markers: usize,
}

/// Output of `pinroute list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Listing {
    pub(crate) categories: Vec<CategoryView>,
    pub(crate) markers: Vec<MarkerView>,
}

/// A marker reported by `pinroute near`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct NearbyMarker {
    #[serde(flatten)]
    pub(crate) marker: MarkerView,
    pub(crate) distance_m: f64,
}

pub(crate) fn load_markers(store: &StoreLocation) -> Result<MarkerRegistry, CliError> {
    let backing = FileKeyValueStore::new(store.path.clone());
    let mut registry = MarkerRegistry::new();
    let summary = load_registry(&backing, &store.key, &mut registry).map_err(|source| {
        CliError::LoadMarkers {
            path: store.path.clone(),
            source,
        }
    })?;
    if summary.skipped > 0 {
        log::warn!(
            "skipped {} unusable markers in {}",
            summary.skipped,
            store.path
        );
    }
    Ok(registry)
}

fn save_markers(store: &StoreLocation, registry: &MarkerRegistry) -> Result<(), CliError> {
    let mut backing = FileKeyValueStore::new(store.path.clone());
    save_registry(&mut backing, &store.key, registry).map_err(|source| CliError::SaveMarkers {
        path: store.path.clone(),
        source,
    })
}

fn view_of(registry: &MarkerRegistry, id: PointId) -> Result<MarkerView, CliError> {
    registry
        .get(id)
        .map(|point| MarkerView::new(registry, point))
        .ok_or(CliError::UnknownMarker { id: id.get() })
}

pub(crate) fn run_add(
    store: &StoreLocation,
    args: AddArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let mut registry = load_markers(store)?;
    let id = registry.add(lat_lng(args.lat, args.lng), &args.name, &args.category)?;
    save_markers(store, &registry)?;
    info!("added marker {id} to {}", store.path);
    write_json(writer, &view_of(&registry, id)?)
}

pub(crate) fn run_remove(
    store: &StoreLocation,
    args: RemoveArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let mut registry = load_markers(store)?;
    let id = PointId::new(args.id);
    let view = view_of(&registry, id)?;
    registry.remove(id);
    save_markers(store, &registry)?;
    info!("removed marker {id} from {}", store.path);
    write_json(writer, &view)
}

pub(crate) fn run_reassign(
    store: &StoreLocation,
    args: ReassignArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let mut registry = load_markers(store)?;
    let id = PointId::new(args.id);
    view_of(&registry, id)?;
    if registry.reassign_category(id, &args.category) {
        save_markers(store, &registry)?;
    } else {
        debug!("marker {id} already in {:?}", args.category);
    }
    write_json(writer, &view_of(&registry, id)?)
}

pub(crate) fn run_list(store: &StoreLocation, writer: &mut dyn Write) -> Result<(), CliError> {
    let registry = load_markers(store)?;
    write_json(writer, &listing(&registry))
}

pub(crate) fn listing(registry: &MarkerRegistry) -> Listing {
    let categories = registry
        .categories()
        .iter()
        .map(|category| CategoryView {
            name: category.name().to_owned(),
            markers: registry
                .points()
                .filter(|point| point.category() == category.name())
                .count(),
        })
        .collect();
    let markers = registry
        .points()
        .map(|point| MarkerView::new(registry, point))
        .collect();
    Listing {
        categories,
        markers,
    }
}

pub(crate) fn run_near(
    store: &StoreLocation,
    args: NearArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    if !(args.radius.is_finite() && args.radius >= 0.0) {
        return Err(CliError::InvalidArgument {
            field: "radius",
            message: format!("{} is not a non-negative distance", args.radius),
        });
    }
    let mut registry = load_markers(store)?;
    let here = lat_lng(args.lat, args.lng);
    let alerts = ProximityMonitor::new(args.radius).check(&mut registry, here);
    let nearby: Vec<NearbyMarker> = alerts
        .iter()
        .filter_map(|alert| registry.get(alert.id))
        .map(|point| NearbyMarker {
            marker: MarkerView::new(&registry, point),
            distance_m: HaversineMetric.distance_m(here, point.position()),
        })
        .collect();
    write_json(writer, &nearby)
}
