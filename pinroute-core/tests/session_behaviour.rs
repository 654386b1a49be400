//! Behavioural tests for the event-driven marker session.

use std::cell::RefCell;

use pinroute_core::test_support::{FlatMetric, RecordingRoutingProvider};
use pinroute_core::{
    Effect, Event, Notice, RoutingError, Session, SessionConfig, TravelMode, lat_lng,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

type SessionCell = RefCell<Session<FlatMetric>>;
type ProviderCell = RefCell<RecordingRoutingProvider>;
type EffectsCell = RefCell<Vec<Effect>>;

#[fixture]
fn session() -> SessionCell {
    // Flat distances are in degrees.
    let config = SessionConfig {
        proximity_radius_m: 0.5,
        ..SessionConfig::default()
    };
    RefCell::new(Session::with_metric(FlatMetric, config))
}

#[fixture]
fn provider() -> ProviderCell {
    RefCell::new(RecordingRoutingProvider::default())
}

/// Every effect produced by the scenario's `when` steps.
#[fixture]
fn effects() -> EffectsCell {
    RefCell::new(Vec::new())
}

fn dispatch(session: &SessionCell, provider: &ProviderCell, effects: &EffectsCell, event: Event) {
    let produced = session
        .borrow_mut()
        .handle_with(event, &*provider.borrow());
    effects.borrow_mut().extend(produced);
}

#[given("a session with three markers along the equator")]
fn three_markers(session: &SessionCell) {
    let mut session = session.borrow_mut();
    for (lng, label, category) in [(1.0, "A", "cafe"), (3.0, "C", "cafe"), (2.0, "B", "park")] {
        let produced = session.handle(Event::MapClicked {
            position: lat_lng(0.0, lng),
            label: label.into(),
            category: category.into(),
        });
        assert_eq!(produced, vec![Effect::RefreshMarkers]);
    }
}

#[given("a position fix at the origin")]
fn fix_at_origin(session: &SessionCell) {
    session
        .borrow_mut()
        .handle(Event::PositionUpdated(lat_lng(0.0, 0.0)));
}

#[given("a routing service that fails")]
fn failing_service(provider: &ProviderCell) {
    *provider.borrow_mut() = RecordingRoutingProvider::failing(RoutingError::Timeout {
        url: "http://router.invalid/route/v1/foot".into(),
        timeout_secs: 30,
    });
}

#[when("a walking route is drawn")]
fn draw_walking_route(session: &SessionCell, provider: &ProviderCell, effects: &EffectsCell) {
    dispatch(
        session,
        provider,
        effects,
        Event::DrawRouteRequested {
            mode: TravelMode::Walk,
        },
    );
}

#[when("the park category is disabled")]
fn disable_park(session: &SessionCell, provider: &ProviderCell, effects: &EffectsCell) {
    dispatch(
        session,
        provider,
        effects,
        Event::CategoryToggled {
            category: "park".into(),
            enabled: false,
        },
    );
}

#[when("the user arrives at the first marker twice")]
fn arrive_twice(session: &SessionCell, provider: &ProviderCell, effects: &EffectsCell) {
    for _ in 0..2 {
        dispatch(
            session,
            provider,
            effects,
            Event::PositionUpdated(lat_lng(0.0, 1.0)),
        );
    }
}

#[then("the route runs through all three markers in order")]
fn route_through_three(provider: &ProviderCell) {
    let requests = provider.borrow().requests();
    let request = requests.last().expect("a route was requested");
    assert_eq!(request.start, lat_lng(0.0, 0.0));
    assert_eq!(
        request.stops,
        vec![lat_lng(0.0, 1.0), lat_lng(0.0, 2.0), lat_lng(0.0, 3.0)]
    );
    assert_eq!(request.mode, TravelMode::Walk);
}

#[then("the route is shown on the map")]
fn route_shown(session: &SessionCell, effects: &EffectsCell) {
    assert!(
        effects
            .borrow()
            .iter()
            .any(|effect| matches!(effect, Effect::ShowRoute { .. }))
    );
    assert!(session.borrow().shown_route().is_some());
}

#[then("the user is told their location is unavailable")]
fn told_location_unavailable(effects: &EffectsCell) {
    assert!(
        effects
            .borrow()
            .contains(&Effect::Notify(Notice::LocationUnavailable))
    );
}

#[then("no route is requested")]
fn no_route_requested(provider: &ProviderCell) {
    assert!(provider.borrow().requests().is_empty());
}

#[then("the user is told routing failed")]
fn told_routing_failed(effects: &EffectsCell) {
    assert!(
        effects
            .borrow()
            .iter()
            .any(|effect| matches!(effect, Effect::Notify(Notice::RoutingFailed(_))))
    );
}

#[then("no route is shown")]
fn no_route_shown(session: &SessionCell) {
    let session = session.borrow();
    assert!(session.shown_route().is_none());
    assert!(session.pending_route().is_none());
}

#[then("three markers remain")]
fn three_remain(session: &SessionCell) {
    assert_eq!(session.borrow().registry().len(), 3);
}

#[then("the latest route skips the park")]
fn latest_route_skips_park(provider: &ProviderCell) {
    let requests = provider.borrow().requests();
    assert_eq!(requests.len(), 2);
    let latest = requests.last().expect("a redrawn route");
    assert_eq!(latest.stops, vec![lat_lng(0.0, 1.0), lat_lng(0.0, 3.0)]);
}

#[then("exactly one proximity alert is raised")]
fn one_alert(effects: &EffectsCell) {
    let alerts: Vec<String> = effects
        .borrow()
        .iter()
        .filter_map(|effect| match effect {
            Effect::Notify(notice @ Notice::Nearby(_)) => Some(notice.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(alerts, ["You're near \"A\""]);
}

#[scenario(path = "tests/features/session.feature", index = 0)]
fn drawing_route_through_visible_markers(
    session: SessionCell,
    provider: ProviderCell,
    effects: EffectsCell,
) {
    let _ = (session, provider, effects);
}

#[scenario(path = "tests/features/session.feature", index = 1)]
fn drawing_route_before_first_fix(
    session: SessionCell,
    provider: ProviderCell,
    effects: EffectsCell,
) {
    let _ = (session, provider, effects);
}

#[scenario(path = "tests/features/session.feature", index = 2)]
fn failing_routing_keeps_markers(
    session: SessionCell,
    provider: ProviderCell,
    effects: EffectsCell,
) {
    let _ = (session, provider, effects);
}

#[scenario(path = "tests/features/session.feature", index = 3)]
fn hiding_category_redraws_route(
    session: SessionCell,
    provider: ProviderCell,
    effects: EffectsCell,
) {
    let _ = (session, provider, effects);
}

#[scenario(path = "tests/features/session.feature", index = 4)]
fn arriving_near_marker_alerts_once(
    session: SessionCell,
    provider: ProviderCell,
    effects: EffectsCell,
) {
    let _ = (session, provider, effects);
}
