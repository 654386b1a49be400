//! Single-threaded dispatcher tying the registry, planner and proximity
//! monitor to UI events.
//!
//! Every external happening (a map click, a position fix, a routing reply) is
//! an [`Event`]. [`Session::handle`] runs it to completion and returns the
//! [`Effect`]s the embedder should apply to its map surface, notifier and
//! store. Nothing here suspends, so events never interleave.
//!
//! Route requests carry a [`RouteTicket`]. Only the most recent ticket is
//! honoured; replies to superseded requests are dropped, which keeps at most
//! one route on the map.

use std::collections::VecDeque;
use std::fmt;

use geo::Coord;
use log::{debug, warn};

use crate::category::DEFAULT_CATEGORY;
use crate::distance::{DistanceMetric, HaversineMetric};
use crate::planner::{PlannerConfig, RoutePlanner, RouteTruncated, TravelMode};
use crate::point::PointId;
use crate::proximity::{DEFAULT_PROXIMITY_RADIUS_M, ProximityAlert, ProximityMonitor};
use crate::registry::{MarkerRegistry, RegistryError};
use crate::routing::{RouteGeometry, RouteRequest, RoutingError, RoutingProvider};

/// Zoom level used when centring on a geocoding result.
pub const GEOCODE_ZOOM: u8 = 15;

/// Identifies one draw-route request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteTicket(u64);

impl RouteTicket {
    /// Raw ticket number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A search result from an external geocoder.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    /// Where the result lies.
    pub position: Coord<f64>,
    /// Human-readable name, used as the point label.
    pub display_name: String,
}

/// Why an operation was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRejection {
    /// A label was blank.
    EmptyLabel,
    /// A coordinate was NaN or infinite.
    NonFinitePosition,
    /// Not enough visible points to draw a route.
    TooFewVisiblePoints {
        /// Points currently visible.
        visible: usize,
        /// Points required.
        required: usize,
    },
}

impl From<RegistryError> for InputRejection {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::EmptyLabel => Self::EmptyLabel,
            RegistryError::NonFinitePosition => Self::NonFinitePosition,
        }
    }
}

/// A user-facing notification. None of these are fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A request was refused and nothing changed.
    InputRejected(InputRejection),
    /// The route was capped to the closest stops.
    RouteTruncated(RouteTruncated),
    /// The routing service failed; any pending route was discarded.
    RoutingFailed(RoutingError),
    /// No position fix has arrived yet.
    LocationUnavailable,
    /// The user is near a point for the first time.
    Nearby(ProximityAlert),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputRejected(InputRejection::EmptyLabel) => {
                f.write_str("Enter a location name.")
            }
            Self::InputRejected(InputRejection::NonFinitePosition) => {
                f.write_str("That position is not on the map.")
            }
            Self::InputRejected(InputRejection::TooFewVisiblePoints { visible, required }) => {
                write!(
                    f,
                    "Need at least {required} visible markers to draw a route ({visible} visible)."
                )
            }
            Self::RouteTruncated(truncated) => write!(
                f,
                "Route limited to the {} closest markers for reliability.",
                truncated.kept
            ),
            Self::RoutingFailed(_) => f.write_str("Routing failed or timed out. Please try again."),
            Self::LocationUnavailable => f.write_str("Location not available yet."),
            Self::Nearby(alert) => write!(f, "You're near \"{}\"", alert.label),
        }
    }
}

/// Something that happened outside the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The user clicked the map and filled in the add form.
    MapClicked {
        /// Clicked position.
        position: Coord<f64>,
        /// Entered name.
        label: String,
        /// Entered category; blank means the default.
        category: String,
    },
    /// A geocoder search finished; `None` when nothing matched.
    GeocodeResolved(Option<GeocodeHit>),
    /// The user deleted a marker.
    DeleteRequested(PointId),
    /// The user moved a marker to another category.
    ReassignRequested {
        /// Point to move.
        id: PointId,
        /// Target category.
        category: String,
    },
    /// A category checkbox changed.
    CategoryToggled {
        /// Category name.
        category: String,
        /// New state.
        enabled: bool,
    },
    /// The position stream delivered a fix.
    PositionUpdated(Coord<f64>),
    /// The position stream reported it is unavailable.
    PositionUnavailable,
    /// The user toggled the "you are here" marker.
    UserMarkerToggled,
    /// The user asked for a route through the visible markers.
    DrawRouteRequested {
        /// Travel mode.
        mode: TravelMode,
    },
    /// The routing service answered a request.
    RouteResolved {
        /// Ticket of the request being answered.
        ticket: RouteTicket,
        /// Geometry or failure.
        result: Result<RouteGeometry, RoutingError>,
    },
    /// Drop every marker and any route.
    Reset,
}

/// Something the embedder should do in response to an [`Event`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Markers or categories changed; redraw them from the registry.
    RefreshMarkers,
    /// Place or move the "you are here" marker.
    RenderUserMarker {
        /// Latest fix.
        position: Coord<f64>,
        /// Whether the marker should be shown.
        visible: bool,
    },
    /// Centre the viewport.
    CenterOn {
        /// Target position.
        position: Coord<f64>,
        /// Target zoom level.
        zoom: u8,
    },
    /// Ask the routing service for geometry.
    RequestRoute {
        /// Ticket to quote in the reply.
        ticket: RouteTicket,
        /// Ordered stops and travel mode.
        request: RouteRequest,
    },
    /// Remove the route currently shown or pending.
    ClearRoute,
    /// Draw route geometry.
    ShowRoute {
        /// Ticket of the request that produced the geometry.
        ticket: RouteTicket,
        /// Geometry to draw.
        geometry: RouteGeometry,
    },
    /// Tell the user something.
    Notify(Notice),
    /// Save a registry snapshot.
    Persist,
}

/// Tunables for [`Session`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Route planner settings.
    pub planner: PlannerConfig,
    /// Proximity alert radius in metres.
    pub proximity_radius_m: f64,
    /// Emit [`Effect::Persist`] after marker changes.
    pub persist_changes: bool,
    /// Fewest visible points for which a route is drawn.
    pub min_route_stops: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            proximity_radius_m: DEFAULT_PROXIMITY_RADIUS_M,
            persist_changes: false,
            min_route_stops: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteState {
    Idle,
    Pending { ticket: RouteTicket, mode: TravelMode },
    Shown { ticket: RouteTicket, mode: TravelMode },
}

impl RouteState {
    const fn mode(self) -> Option<TravelMode> {
        match self {
            Self::Idle => None,
            Self::Pending { mode, .. } | Self::Shown { mode, .. } => Some(mode),
        }
    }
}

/// Owns the marker registry and reacts to UI events.
///
/// # Examples
/// ```
/// use pinroute_core::{Effect, Event, Session, SessionConfig, TravelMode, lat_lng};
///
/// let mut session = Session::new(SessionConfig::default());
/// for (lat, label) in [(37.0, "A"), (37.001, "B")] {
///     session.handle(Event::MapClicked {
///         position: lat_lng(lat, -122.0),
///         label: label.into(),
///         category: "cafe".into(),
///     });
/// }
/// session.handle(Event::PositionUpdated(lat_lng(36.99, -122.0)));
///
/// let effects = session.handle(Event::DrawRouteRequested { mode: TravelMode::Walk });
/// assert!(matches!(effects.last(), Some(Effect::RequestRoute { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct Session<M = HaversineMetric> {
    registry: MarkerRegistry,
    planner: RoutePlanner<M>,
    monitor: ProximityMonitor<M>,
    config: SessionConfig,
    last_fix: Option<Coord<f64>>,
    user_marker_visible: bool,
    route: RouteState,
    route_stops: Vec<PointId>,
    last_ticket: u64,
}

impl Session {
    /// Construct a session using haversine distances.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_metric(HaversineMetric, config)
    }
}

impl<M> Session<M>
where
    M: DistanceMetric + Clone,
{
    /// Construct a session with an explicit distance metric.
    pub fn with_metric(metric: M, config: SessionConfig) -> Self {
        Self::with_registry(MarkerRegistry::new(), metric, config)
    }

    /// Construct a session around an existing registry, e.g. one restored
    /// from a snapshot.
    pub fn with_registry(registry: MarkerRegistry, metric: M, config: SessionConfig) -> Self {
        Self {
            registry,
            planner: RoutePlanner::with_metric(metric.clone(), config.planner),
            monitor: ProximityMonitor::with_metric(metric, config.proximity_radius_m),
            config,
            last_fix: None,
            user_marker_visible: true,
            route: RouteState::Idle,
            route_stops: Vec::new(),
            last_ticket: 0,
        }
    }

    /// Read access to the registry.
    pub const fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    /// Direct access to the registry, bypassing effects.
    pub const fn registry_mut(&mut self) -> &mut MarkerRegistry {
        &mut self.registry
    }

    /// The most recent position fix.
    pub const fn last_fix(&self) -> Option<Coord<f64>> {
        self.last_fix
    }

    /// Ticket of the request awaiting a reply, if any.
    pub const fn pending_route(&self) -> Option<RouteTicket> {
        match self.route {
            RouteState::Pending { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    /// Ticket of the route currently shown, if any.
    pub const fn shown_route(&self) -> Option<RouteTicket> {
        match self.route {
            RouteState::Shown { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    /// Points visited by the pending or shown route, in visiting order.
    ///
    /// Empty when no route is active.
    pub fn route_stops(&self) -> &[PointId] {
        &self.route_stops
    }

    /// Apply one event and return the resulting effects.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::MapClicked {
                position,
                label,
                category,
            } => self.add_point(position, &label, &category, None),
            Event::GeocodeResolved(Some(hit)) => self.add_point(
                hit.position,
                &hit.display_name,
                DEFAULT_CATEGORY,
                Some(hit.position),
            ),
            Event::GeocodeResolved(None) => Vec::new(),
            Event::DeleteRequested(id) => match self.registry.remove(id) {
                Some(_) => self.markers_changed(),
                None => Vec::new(),
            },
            Event::ReassignRequested { id, category } => {
                if self.registry.reassign_category(id, &category) {
                    self.markers_changed()
                } else {
                    Vec::new()
                }
            }
            Event::CategoryToggled { category, enabled } => {
                self.toggle_category(&category, enabled)
            }
            Event::PositionUpdated(position) => self.position_updated(position),
            Event::PositionUnavailable => {
                warn!("position stream unavailable");
                Vec::new()
            }
            Event::UserMarkerToggled => self.toggle_user_marker(),
            Event::DrawRouteRequested { mode } => self.draw_route(mode),
            Event::RouteResolved { ticket, result } => self.route_resolved(ticket, result),
            Event::Reset => self.reset(),
        }
    }

    /// Apply one event, resolving any route requests it triggers through
    /// `provider` before returning.
    ///
    /// The returned effects never contain [`Effect::RequestRoute`].
    pub fn handle_with<P>(&mut self, event: Event, provider: &P) -> Vec<Effect>
    where
        P: RoutingProvider + ?Sized,
    {
        let mut queue: VecDeque<Effect> = self.handle(event).into();
        let mut applied = Vec::with_capacity(queue.len());
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::RequestRoute { ticket, request } => {
                    let result = provider.route(&request);
                    queue.extend(self.handle(Event::RouteResolved { ticket, result }));
                }
                other => applied.push(other),
            }
        }
        applied
    }

    fn add_point(
        &mut self,
        position: Coord<f64>,
        label: &str,
        category: &str,
        center_on: Option<Coord<f64>>,
    ) -> Vec<Effect> {
        match self.registry.add(position, label, category) {
            Ok(_) => {
                let mut effects = self.markers_changed();
                if let Some(target) = center_on {
                    effects.push(Effect::CenterOn {
                        position: target,
                        zoom: GEOCODE_ZOOM,
                    });
                }
                effects
            }
            Err(err) => {
                // Mirrors an abandoned prompt: nothing changes, nothing is shown.
                debug!("add rejected: {err}");
                Vec::new()
            }
        }
    }

    fn markers_changed(&self) -> Vec<Effect> {
        let mut effects = vec![Effect::RefreshMarkers];
        if self.config.persist_changes {
            effects.push(Effect::Persist);
        }
        effects
    }

    fn toggle_category(&mut self, category: &str, enabled: bool) -> Vec<Effect> {
        if !self.registry.set_category_enabled(category, enabled) {
            return Vec::new();
        }
        let mut effects = vec![Effect::RefreshMarkers];
        if let Some(mode) = self.route.mode() {
            effects.extend(self.draw_route(mode));
        }
        effects
    }

    fn position_updated(&mut self, position: Coord<f64>) -> Vec<Effect> {
        if !(position.x.is_finite() && position.y.is_finite()) {
            warn!("ignoring non-finite position fix");
            return Vec::new();
        }
        self.last_fix = Some(position);
        let mut effects = vec![Effect::RenderUserMarker {
            position,
            visible: self.user_marker_visible,
        }];
        effects.extend(
            self.monitor
                .check(&mut self.registry, position)
                .into_iter()
                .map(|alert| Effect::Notify(Notice::Nearby(alert))),
        );
        effects
    }

    fn toggle_user_marker(&mut self) -> Vec<Effect> {
        let Some(position) = self.last_fix else {
            return vec![Effect::Notify(Notice::LocationUnavailable)];
        };
        self.user_marker_visible = !self.user_marker_visible;
        vec![Effect::RenderUserMarker {
            position,
            visible: self.user_marker_visible,
        }]
    }

    fn draw_route(&mut self, mode: TravelMode) -> Vec<Effect> {
        let mut effects = self.clear_route();

        let Some(start) = self.last_fix else {
            effects.push(Effect::Notify(Notice::LocationUnavailable));
            return effects;
        };

        let (ids, stops): (Vec<PointId>, Vec<Coord<f64>>) = self
            .registry
            .visible_points()
            .map(|point| (point.id(), point.position()))
            .unzip();
        if stops.len() < self.config.min_route_stops {
            effects.push(Effect::Notify(Notice::InputRejected(
                InputRejection::TooFewVisiblePoints {
                    visible: stops.len(),
                    required: self.config.min_route_stops,
                },
            )));
            return effects;
        }

        let plan = self.planner.plan(start, &stops, mode);
        if let Some(truncated) = plan.truncated {
            effects.push(Effect::Notify(Notice::RouteTruncated(truncated)));
        }

        self.last_ticket = self.last_ticket.saturating_add(1);
        let ticket = RouteTicket(self.last_ticket);
        self.route = RouteState::Pending { ticket, mode };
        self.route_stops = plan
            .order
            .iter()
            .filter_map(|index| ids.get(*index).copied())
            .collect();
        debug!(
            "requesting {mode} route {} through {} stops",
            ticket.get(),
            plan.stops.len()
        );
        effects.push(Effect::RequestRoute {
            ticket,
            request: RouteRequest::from(plan),
        });
        effects
    }

    fn clear_route(&mut self) -> Vec<Effect> {
        self.route_stops.clear();
        if self.route == RouteState::Idle {
            return Vec::new();
        }
        self.route = RouteState::Idle;
        vec![Effect::ClearRoute]
    }

    fn route_resolved(
        &mut self,
        ticket: RouteTicket,
        result: Result<RouteGeometry, RoutingError>,
    ) -> Vec<Effect> {
        let RouteState::Pending {
            ticket: pending,
            mode,
        } = self.route
        else {
            debug!("dropping reply for route {} with nothing pending", ticket.get());
            return Vec::new();
        };
        if pending != ticket {
            debug!("dropping superseded reply for route {}", ticket.get());
            return Vec::new();
        }

        match result {
            Ok(geometry) => {
                self.route = RouteState::Shown { ticket, mode };
                vec![Effect::ShowRoute { ticket, geometry }]
            }
            Err(err) => {
                warn!("route {} failed: {err}", ticket.get());
                self.route = RouteState::Idle;
                self.route_stops.clear();
                vec![Effect::Notify(Notice::RoutingFailed(err))]
            }
        }
    }

    fn reset(&mut self) -> Vec<Effect> {
        let mut effects = self.clear_route();
        self.registry.reset();
        effects.extend(self.markers_changed());
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::lat_lng;
    use crate::test_support::{FlatMetric, RecordingRoutingProvider};
    use rstest::{fixture, rstest};

    fn click(lat: f64, lng: f64, label: &str, category: &str) -> Event {
        Event::MapClicked {
            position: lat_lng(lat, lng),
            label: label.into(),
            category: category.into(),
        }
    }

    #[fixture]
    fn session() -> Session<FlatMetric> {
        // Flat distances are in degrees, so shrink the alert radius to match.
        let config = SessionConfig {
            proximity_radius_m: 0.5,
            ..SessionConfig::default()
        };
        let mut session = Session::with_metric(FlatMetric, config);
        session.handle(click(0.0, 1.0, "A", "cafe"));
        session.handle(click(0.0, 3.0, "C", "cafe"));
        session.handle(click(0.0, 2.0, "B", "park"));
        session
    }

    fn request_of(effects: &[Effect]) -> Option<(RouteTicket, RouteRequest)> {
        effects.iter().find_map(|effect| match effect {
            Effect::RequestRoute { ticket, request } => Some((*ticket, request.clone())),
            _ => None,
        })
    }

    fn geometry() -> RouteGeometry {
        RouteGeometry {
            coordinates: vec![lat_lng(0.0, 0.0), lat_lng(0.0, 1.0)],
            distance_m: 1.0,
            duration: std::time::Duration::from_secs(1),
        }
    }

    #[rstest]
    fn click_adds_point_and_refreshes() {
        let mut session = Session::new(SessionConfig::default());
        let effects = session.handle(click(1.0, 1.0, "A", ""));
        assert_eq!(effects, vec![Effect::RefreshMarkers]);
        assert_eq!(session.registry().len(), 1);
    }

    #[rstest]
    fn blank_label_is_silently_ignored() {
        let mut session = Session::new(SessionConfig::default());
        assert!(session.handle(click(1.0, 1.0, "  ", "")).is_empty());
        assert!(session.registry().is_empty());
    }

    #[rstest]
    fn persistence_flag_adds_persist_effect() {
        let config = SessionConfig {
            persist_changes: true,
            ..SessionConfig::default()
        };
        let mut session = Session::new(config);
        let effects = session.handle(click(1.0, 1.0, "A", ""));
        assert_eq!(effects, vec![Effect::RefreshMarkers, Effect::Persist]);
    }

    #[rstest]
    fn geocode_hit_lands_in_default_and_centres() {
        let mut session = Session::new(SessionConfig::default());
        let position = lat_lng(35.68, 139.76);
        let effects = session.handle(Event::GeocodeResolved(Some(GeocodeHit {
            position,
            display_name: "Tokyo Station".into(),
        })));
        assert!(effects.contains(&Effect::CenterOn {
            position,
            zoom: GEOCODE_ZOOM
        }));
        let point = session.registry().points().next().expect("point");
        assert_eq!(point.category(), DEFAULT_CATEGORY);
        assert_eq!(point.label(), "Tokyo Station");
        assert!(session.handle(Event::GeocodeResolved(None)).is_empty());
    }

    #[rstest]
    fn draw_route_without_fix_reports_location_unavailable(mut session: Session<FlatMetric>) {
        let effects = session.handle(Event::DrawRouteRequested {
            mode: TravelMode::Car,
        });
        assert_eq!(effects, vec![Effect::Notify(Notice::LocationUnavailable)]);
    }

    #[rstest]
    fn draw_route_orders_visible_points(mut session: Session<FlatMetric>) {
        session.handle(Event::PositionUpdated(lat_lng(0.0, 0.0)));
        let effects = session.handle(Event::DrawRouteRequested {
            mode: TravelMode::Walk,
        });
        let (_, request) = request_of(&effects).expect("route requested");
        assert_eq!(
            request.stops,
            vec![lat_lng(0.0, 1.0), lat_lng(0.0, 2.0), lat_lng(0.0, 3.0)]
        );
        assert_eq!(request.mode, TravelMode::Walk);
    }

    #[rstest]
    fn draw_route_rejects_too_few_visible_points(mut session: Session<FlatMetric>) {
        session.handle(Event::PositionUpdated(lat_lng(0.0, 0.0)));
        session.handle(Event::CategoryToggled {
            category: "cafe".into(),
            enabled: false,
        });
        let effects = session.handle(Event::DrawRouteRequested {
            mode: TravelMode::Car,
        });
        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::InputRejected(
                InputRejection::TooFewVisiblePoints {
                    visible: 1,
                    required: 2
                }
            ))]
        );
    }

    #[rstest]
    fn newer_request_supersedes_older_reply(mut session: Session<FlatMetric>) {
        session.handle(Event::PositionUpdated(lat_lng(0.0, 0.0)));
        let first = request_of(&session.handle(Event::DrawRouteRequested {
            mode: TravelMode::Car,
        }))
        .expect("first request");
        let second_effects = session.handle(Event::DrawRouteRequested {
            mode: TravelMode::Car,
        });
        assert_eq!(second_effects.first(), Some(&Effect::ClearRoute));
        let second = request_of(&second_effects).expect("second request");

        let stale = session.handle(Event::RouteResolved {
            ticket: first.0,
            result: Ok(geometry()),
        });
        assert!(stale.is_empty());

        let fresh = session.handle(Event::RouteResolved {
            ticket: second.0,
            result: Ok(geometry()),
        });
        assert_eq!(
            fresh,
            vec![Effect::ShowRoute {
                ticket: second.0,
                geometry: geometry()
            }]
        );
        assert_eq!(session.shown_route(), Some(second.0));
    }

    #[rstest]
    fn routing_failure_discards_pending_route(mut session: Session<FlatMetric>) {
        session.handle(Event::PositionUpdated(lat_lng(0.0, 0.0)));
        let (ticket, _) = request_of(&session.handle(Event::DrawRouteRequested {
            mode: TravelMode::Car,
        }))
        .expect("request");
        let err = RoutingError::NetworkError {
            url: "http://router.invalid".into(),
            message: "connection refused".into(),
        };
        let effects = session.handle(Event::RouteResolved {
            ticket,
            result: Err(err.clone()),
        });
        assert_eq!(effects, vec![Effect::Notify(Notice::RoutingFailed(err))]);
        assert!(session.pending_route().is_none());
        assert!(session.shown_route().is_none());
        assert!(session.route_stops().is_empty());
    }

    #[rstest]
    fn handle_with_returns_shown_route_without_requests(mut session: Session<FlatMetric>) {
        let provider = RecordingRoutingProvider::default();
        session.handle(Event::PositionUpdated(lat_lng(0.0, 0.0)));
        let effects = session.handle_with(
            Event::DrawRouteRequested {
                mode: TravelMode::Walk,
            },
            &provider,
        );

        assert!(request_of(&effects).is_none());
        let shown = effects.iter().find_map(|effect| match effect {
            Effect::ShowRoute { ticket, geometry } => Some((*ticket, geometry.clone())),
            _ => None,
        });
        let (ticket, geometry) = shown.expect("route shown");
        assert_eq!(session.shown_route(), Some(ticket));
        assert_eq!(geometry.coordinates.len(), 4);
        assert_eq!(provider.requests().len(), 1);
    }

    #[rstest]
    fn route_stops_name_points_in_visiting_order(mut session: Session<FlatMetric>) {
        session.handle(Event::PositionUpdated(lat_lng(0.0, 0.0)));
        session.handle(Event::DrawRouteRequested {
            mode: TravelMode::Car,
        });
        let labels: Vec<&str> = session
            .route_stops()
            .iter()
            .filter_map(|id| session.registry().get(*id))
            .map(|point| point.label())
            .collect();
        assert_eq!(labels, ["A", "B", "C"]);
    }

    #[rstest]
    fn route_stops_tell_apart_points_sharing_a_position() {
        let mut session = Session::with_metric(FlatMetric, SessionConfig::default());
        session.handle(click(0.0, 1.0, "Upstairs", ""));
        session.handle(click(0.0, 1.0, "Downstairs", ""));
        session.handle(Event::PositionUpdated(lat_lng(0.0, 0.0)));
        session.handle(Event::DrawRouteRequested {
            mode: TravelMode::Walk,
        });
        assert_eq!(session.route_stops(), [PointId::new(1), PointId::new(2)]);
    }

    #[rstest]
    fn toggling_category_redraws_active_route(mut session: Session<FlatMetric>) {
        let provider = RecordingRoutingProvider::default();
        session.handle(Event::PositionUpdated(lat_lng(0.0, 0.0)));
        session.handle_with(
            Event::DrawRouteRequested {
                mode: TravelMode::Walk,
            },
            &provider,
        );
        let effects = session.handle_with(
            Event::CategoryToggled {
                category: "park".into(),
                enabled: false,
            },
            &provider,
        );
        assert_eq!(effects.first(), Some(&Effect::RefreshMarkers));
        assert!(effects.contains(&Effect::ClearRoute));
        let requests = provider.requests();
        let last = requests.last().expect("redrawn route");
        assert_eq!(last.stops, vec![lat_lng(0.0, 1.0), lat_lng(0.0, 3.0)]);
        assert_eq!(last.mode, TravelMode::Walk);
    }

    #[rstest]
    fn proximity_alert_fires_once(mut session: Session<FlatMetric>) {
        let here = lat_lng(0.0, 1.0);
        let first = session.handle(Event::PositionUpdated(here));
        let nearby = first
            .iter()
            .filter(|effect| matches!(effect, Effect::Notify(Notice::Nearby(_))))
            .count();
        assert_eq!(nearby, 1);

        let second = session.handle(Event::PositionUpdated(here));
        assert_eq!(
            second,
            vec![Effect::RenderUserMarker {
                position: here,
                visible: true
            }]
        );
    }

    #[rstest]
    fn user_marker_toggle_needs_a_fix() {
        let mut session = Session::new(SessionConfig::default());
        assert_eq!(
            session.handle(Event::UserMarkerToggled),
            vec![Effect::Notify(Notice::LocationUnavailable)]
        );
        let here = lat_lng(1.0, 1.0);
        session.handle(Event::PositionUpdated(here));
        assert_eq!(
            session.handle(Event::UserMarkerToggled),
            vec![Effect::RenderUserMarker {
                position: here,
                visible: false
            }]
        );
    }

    #[rstest]
    fn delete_of_unknown_point_is_noop(mut session: Session<FlatMetric>) {
        assert!(session.handle(Event::DeleteRequested(PointId::new(999))).is_empty());
        assert_eq!(session.registry().len(), 3);
    }

    #[rstest]
    fn reset_clears_route_and_points(mut session: Session<FlatMetric>) {
        session.handle(Event::PositionUpdated(lat_lng(0.0, 0.0)));
        session.handle(Event::DrawRouteRequested {
            mode: TravelMode::Car,
        });
        let effects = session.handle(Event::Reset);
        assert_eq!(effects, vec![Effect::ClearRoute, Effect::RefreshMarkers]);
        assert!(session.registry().is_empty());
        assert!(session.route_stops().is_empty());
    }

    #[rstest]
    fn notices_render_user_messages() {
        let truncated = Notice::RouteTruncated(RouteTruncated {
            requested: 12,
            kept: 10,
        });
        assert_eq!(
            truncated.to_string(),
            "Route limited to the 10 closest markers for reliability."
        );
        assert_eq!(
            Notice::LocationUnavailable.to_string(),
            "Location not available yet."
        );
    }
}
