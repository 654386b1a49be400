//! Greedy nearest-neighbour ordering of route stops.
//!
//! The planner only decides the visiting order. Road geometry, ETAs and turn
//! instructions come from a [`RoutingProvider`](crate::RoutingProvider).

use std::fmt;
use std::str::FromStr;

use geo::Coord;
use log::info;
use thiserror::Error;

use crate::distance::{DistanceMetric, HaversineMetric};

/// Stop cap applied after ordering. Public routing services become slow or
/// unreliable beyond this many waypoints.
pub const DEFAULT_MAX_STOPS: usize = 10;

/// How the route will be travelled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TravelMode {
    /// Driving.
    #[default]
    Car,
    /// Walking.
    Walk,
}

impl TravelMode {
    /// Interpret a free-text prompt answer.
    ///
    /// Only `"walk"` (any case, surrounding whitespace ignored) selects
    /// walking; anything else falls back to driving.
    ///
    /// # Examples
    /// ```
    /// use pinroute_core::TravelMode;
    ///
    /// assert_eq!(TravelMode::from_prompt(" Walk "), TravelMode::Walk);
    /// assert_eq!(TravelMode::from_prompt("bicycle"), TravelMode::Car);
    /// ```
    #[must_use]
    pub fn from_prompt(answer: &str) -> Self {
        if answer.trim().eq_ignore_ascii_case("walk") {
            Self::Walk
        } else {
            Self::Car
        }
    }

    /// Canonical lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Walk => "walk",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`TravelMode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown travel mode {0:?} (expected \"car\" or \"walk\")")]
pub struct ParseTravelModeError(String);

impl FromStr for TravelMode {
    type Err = ParseTravelModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "car" | "drive" | "driving" => Ok(Self::Car),
            "walk" | "foot" | "walking" => Ok(Self::Walk),
            _ => Err(ParseTravelModeError(s.to_owned())),
        }
    }
}

/// The planner dropped stops to respect its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTruncated {
    /// Number of stops supplied.
    pub requested: usize,
    /// Number of stops kept.
    pub kept: usize,
}

/// Tunables for [`RoutePlanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Maximum number of stops handed to the routing service, excluding the
    /// start.
    pub max_stops: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_stops: DEFAULT_MAX_STOPS,
        }
    }
}

/// Ordered stops ready for a routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Where the route begins.
    pub start: Coord<f64>,
    /// Stops in visiting order, capped at [`PlannerConfig::max_stops`].
    pub stops: Vec<Coord<f64>>,
    /// Index into the input slice of each entry in `stops`.
    pub order: Vec<usize>,
    /// Travel mode passed through to the routing service.
    pub mode: TravelMode,
    /// Present when stops were dropped by the cap.
    pub truncated: Option<RouteTruncated>,
}

/// Orders stops with greedy nearest-neighbour selection.
///
/// Quadratic in the number of stops, which the cap keeps small.
///
/// # Examples
/// ```
/// use pinroute_core::{RoutePlanner, TravelMode, lat_lng};
///
/// let planner = RoutePlanner::new();
/// let plan = planner.plan(
///     lat_lng(0.0, 0.0),
///     &[lat_lng(0.0, 1.0), lat_lng(0.0, 3.0), lat_lng(0.0, 2.0)],
///     TravelMode::Walk,
/// );
/// assert_eq!(
///     plan.stops,
///     vec![lat_lng(0.0, 1.0), lat_lng(0.0, 2.0), lat_lng(0.0, 3.0)]
/// );
/// assert!(plan.truncated.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoutePlanner<M = HaversineMetric> {
    metric: M,
    config: PlannerConfig,
}

impl RoutePlanner {
    /// Construct a planner using haversine distance and the default cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> RoutePlanner<M>
where
    M: DistanceMetric,
{
    /// Construct a planner with an explicit metric and configuration.
    pub const fn with_metric(metric: M, config: PlannerConfig) -> Self {
        Self { metric, config }
    }

    /// The distance metric in use.
    pub const fn metric(&self) -> &M {
        &self.metric
    }

    /// The planner configuration.
    pub const fn config(&self) -> PlannerConfig {
        self.config
    }

    /// Return indices into `stops` in greedy nearest-neighbour order.
    ///
    /// Ties go to the stop that appears first in `stops`. Duplicates are all
    /// visited.
    pub fn order(&self, start: Coord<f64>, stops: &[Coord<f64>]) -> Vec<usize> {
        let mut remaining: Vec<usize> = (0..stops.len()).collect();
        let mut ordered = Vec::with_capacity(stops.len());
        let mut current = start;

        while let Some(slot) = self.nearest_slot(current, &remaining, stops) {
            let index = remaining.remove(slot);
            if let Some(next) = stops.get(index) {
                current = *next;
            }
            ordered.push(index);
        }
        ordered
    }

    /// Order `stops` from `start` and apply the stop cap.
    ///
    /// An empty `stops` slice yields an empty plan.
    pub fn plan(&self, start: Coord<f64>, stops: &[Coord<f64>], mode: TravelMode) -> RoutePlan {
        let mut order = self.order(start, stops);

        let truncated = (order.len() > self.config.max_stops).then(|| {
            let requested = order.len();
            order.truncate(self.config.max_stops);
            info!(
                "route limited to the {} closest of {requested} stops",
                self.config.max_stops
            );
            RouteTruncated {
                requested,
                kept: self.config.max_stops,
            }
        });

        RoutePlan {
            start,
            stops: order
                .iter()
                .filter_map(|index| stops.get(*index).copied())
                .collect(),
            order,
            mode,
            truncated,
        }
    }

    /// Position within `remaining` of the stop closest to `current`.
    fn nearest_slot(
        &self,
        current: Coord<f64>,
        remaining: &[usize],
        stops: &[Coord<f64>],
    ) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (slot, index) in remaining.iter().enumerate() {
            let Some(stop) = stops.get(*index) else {
                continue;
            };
            let distance = self.metric.distance_m(current, *stop);
            // Strict comparison keeps the earliest stop on ties.
            if best.is_none_or(|(_, closest)| distance < closest) {
                best = Some((slot, distance));
            }
        }
        best.map(|(slot, _)| slot)
    }
}
