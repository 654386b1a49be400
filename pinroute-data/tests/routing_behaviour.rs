//! Behavioural tests for routing providers.
//!
//! These tests use [`StubRoutingProvider`] to verify behaviour without
//! requiring a running OSRM service.

use std::cell::RefCell;

use pinroute_core::{
    RouteGeometry, RouteRequest, RoutingError, RoutingProvider, TravelMode, lat_lng,
};
use pinroute_data::routing::test_support::StubRoutingProvider;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// Result cell holding the outcome of a route request.
type ResultCell = RefCell<Result<RouteGeometry, RoutingError>>;

#[fixture]
fn provider() -> RefCell<Option<StubRoutingProvider>> {
    RefCell::new(None)
}

#[fixture]
fn result() -> ResultCell {
    RefCell::new(Err(RoutingError::EmptyInput))
}

fn request_with(stops: u32) -> RouteRequest {
    RouteRequest {
        start: lat_lng(0.0, 0.0),
        stops: (1..=stops).map(|i| lat_lng(0.0, f64::from(i))).collect(),
        mode: TravelMode::Walk,
    }
}

fn send(provider: &RefCell<Option<StubRoutingProvider>>, result: &ResultCell, stops: u32) {
    let guard = provider.borrow();
    let stub = guard.as_ref().expect("provider must be initialised");
    *result.borrow_mut() = stub.route(&request_with(stops));
}

// --- Given steps ---

#[given("a routing service joining stops with straight lines")]
fn routing_service_ok(provider: &RefCell<Option<StubRoutingProvider>>) {
    *provider.borrow_mut() = Some(StubRoutingProvider::straight_lines());
}

#[given("a routing service that fails with a network error")]
fn routing_service_network_error(provider: &RefCell<Option<StubRoutingProvider>>) {
    *provider.borrow_mut() = Some(StubRoutingProvider::with_error(
        RoutingError::NetworkError {
            url: "http://example.com/route/v1/foot".to_owned(),
            message: "connection refused".to_owned(),
        },
    ));
}

#[given("a routing service that times out")]
fn routing_service_timeout(provider: &RefCell<Option<StubRoutingProvider>>) {
    *provider.borrow_mut() = Some(StubRoutingProvider::with_error(RoutingError::Timeout {
        url: "http://example.com/route/v1/foot".to_owned(),
        timeout_secs: 30,
    }));
}

#[given("a routing service returning an error response")]
fn routing_service_error(provider: &RefCell<Option<StubRoutingProvider>>) {
    *provider.borrow_mut() = Some(StubRoutingProvider::with_error(
        RoutingError::ServiceError {
            code: "NoRoute".to_owned(),
            message: "Impossible route between points".to_owned(),
        },
    ));
}

// --- When steps ---

#[when("I request a route through two stops")]
fn request_two(provider: &RefCell<Option<StubRoutingProvider>>, result: &ResultCell) {
    send(provider, result, 2);
}

#[when("I request a route with no stops")]
fn request_none(provider: &RefCell<Option<StubRoutingProvider>>, result: &ResultCell) {
    send(provider, result, 0);
}

// --- Then steps ---

#[then("the geometry starts at the origin and visits both stops")]
fn then_geometry(result: &ResultCell) {
    let borrowed = result.borrow();
    let geometry = borrowed.as_ref().expect("expected Ok result");
    assert_eq!(
        geometry.coordinates,
        vec![lat_lng(0.0, 0.0), lat_lng(0.0, 1.0), lat_lng(0.0, 2.0)]
    );
}

#[then("an empty input error is returned")]
fn then_empty_error(result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Err(RoutingError::EmptyInput)),
        "expected EmptyInput error, got {borrowed:?}"
    );
}

#[then("a network error is returned")]
fn then_network_error(result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Err(RoutingError::NetworkError { .. })),
        "expected NetworkError, got {borrowed:?}"
    );
}

#[then("a timeout error is returned")]
fn then_timeout_error(result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Err(RoutingError::Timeout { .. })),
        "expected Timeout error, got {borrowed:?}"
    );
}

#[then("a service error is returned")]
fn then_service_error(result: &ResultCell) {
    let borrowed = result.borrow();
    assert!(
        matches!(&*borrowed, Err(RoutingError::ServiceError { .. })),
        "expected ServiceError, got {borrowed:?}"
    );
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/routing.feature", name = $title)]
        fn $fn_name(provider: RefCell<Option<StubRoutingProvider>>, result: ResultCell) {
            let _ = (provider, result);
        }
    };
}

register_scenario!(routing_through_two_stops, "routing through two stops");
register_scenario!(routing_with_no_stops, "routing with no stops");
register_scenario!(handling_network_error, "handling a network error");
register_scenario!(handling_timeout, "handling a timeout");
register_scenario!(handling_service_error, "handling a service error response");
