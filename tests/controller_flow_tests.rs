mod common;

use std::sync::Arc;

use common::*;
use turn_guidance::shared::geo::destination_point;
use turn_guidance::{
    Coordinate, LocationError, NavEffect, NavError, NavIntent, NavigationController,
    NavigationOptions, NavigationState, Position, RouteModel, RouteOptions, RouteRequest,
    SessionState,
};

fn request_for(route: &RouteModel) -> RouteRequest {
    RouteRequest {
        origin: route.origin(),
        destination: route.destination(),
        waypoints: vec![],
        options: RouteOptions::default(),
    }
}

fn navigating(route: RouteModel) -> (NavigationController, SessionState) {
    let mut controller = NavigationController::new();
    let mut state = SessionState::new(NavigationOptions::default());

    controller
        .handle_intent(
            &mut state,
            NavIntent::StartRequested {
                request: request_for(&route),
            },
        )
        .expect("Start sollte aus Idle möglich sein");
    let generation = state.route_generation;
    controller
        .handle_intent(
            &mut state,
            NavIntent::RouteCalculated {
                generation,
                result: Ok(route),
                now_ms: 0,
            },
        )
        .expect("Route sollte aktiviert werden");
    state.take_effects();
    (controller, state)
}

fn feed(controller: &mut NavigationController, state: &mut SessionState, position: Position) {
    controller
        .handle_intent(state, NavIntent::PositionReceived { position })
        .expect("Position sollte verarbeitet werden");
}

/// Position `north_m` nördlich des Punkts `along_m` auf der Ost-Geraden ab SF.
fn beside_route(along_m: f64, north_m: f64, ts: u64) -> Position {
    let on_route = destination_point(SF, 90.0, along_m);
    Position::at(destination_point(on_route, 0.0, north_m), ts)
        .with_speed(10.0)
        .with_heading(90.0)
}

#[test]
fn test_start_requested_enters_calculating_and_requests_route() {
    let mut controller = NavigationController::new();
    let mut state = SessionState::new(NavigationOptions::default());
    let route = straight_route(1_000.0);

    controller
        .handle_intent(
            &mut state,
            NavIntent::StartRequested {
                request: request_for(&route),
            },
        )
        .expect("Start sollte ohne Fehler durchlaufen");

    assert!(matches!(state.nav, NavigationState::Calculating));
    assert!(matches!(
        state.streams.current_state(),
        NavigationState::Calculating
    ));
    let effects = state.take_effects();
    assert!(matches!(
        effects.as_slice(),
        [NavEffect::RequestRoute { generation: 1, .. }]
    ));
    assert_eq!(state.command_log.last(), Some("begin_calculation"));
}

#[test]
fn test_start_while_calculating_is_state_violation() {
    let mut controller = NavigationController::new();
    let mut state = SessionState::new(NavigationOptions::default());
    let request = request_for(&straight_route(1_000.0));

    controller
        .handle_intent(
            &mut state,
            NavIntent::StartRequested {
                request: request.clone(),
            },
        )
        .unwrap();
    let result = controller.handle_intent(&mut state, NavIntent::StartRequested { request });

    assert!(matches!(result, Err(NavError::StateViolation(_))));
    assert!(matches!(state.nav, NavigationState::Calculating));
    assert_eq!(state.route_generation, 1);
}

#[test]
fn test_start_with_invalid_coordinate_is_rejected() {
    let mut controller = NavigationController::new();
    let mut state = SessionState::new(NavigationOptions::default());
    let request = RouteRequest {
        origin: SF,
        destination: Coordinate::new(f64::NAN, 0.0),
        waypoints: vec![],
        options: RouteOptions::default(),
    };

    let result = controller.handle_intent(&mut state, NavIntent::StartRequested { request });

    assert!(matches!(result, Err(NavError::InvalidInput(_))));
    assert!(matches!(state.nav, NavigationState::Idle));
    assert!(state.take_effects().is_empty());
}

#[test]
fn test_route_calculated_enters_navigating_and_shows_route() {
    let mut controller = NavigationController::new();
    let mut state = SessionState::new(NavigationOptions::default());
    let route = straight_route(1_000.0);
    controller
        .handle_intent(
            &mut state,
            NavIntent::StartRequested {
                request: request_for(&route),
            },
        )
        .unwrap();
    state.take_effects();

    controller
        .handle_intent(
            &mut state,
            NavIntent::RouteCalculated {
                generation: 1,
                result: Ok(route),
                now_ms: 0,
            },
        )
        .unwrap();

    assert!(state.nav.is_navigating());
    assert!(state.tracker.is_tracking());
    let effects = state.take_effects();
    assert!(effects
        .iter()
        .any(|e| matches!(e, NavEffect::ShowRoute { .. })));
}

#[test]
fn test_initial_routing_failure_enters_error() {
    let mut controller = NavigationController::new();
    let mut state = SessionState::new(NavigationOptions::default());
    controller
        .handle_intent(
            &mut state,
            NavIntent::StartRequested {
                request: request_for(&straight_route(1_000.0)),
            },
        )
        .unwrap();

    controller
        .handle_intent(
            &mut state,
            NavIntent::RouteCalculated {
                generation: 1,
                result: Err(NavError::Routing("HTTP 503".into())),
                now_ms: 0,
            },
        )
        .unwrap();

    assert!(matches!(state.nav, NavigationState::Error { .. }));
    let error = state.streams.subscribe_error().borrow().clone();
    assert!(matches!(error, Some(NavError::Routing(_))));
    assert!(state.nav.can_start());
}

#[test]
fn test_drive_to_destination_announces_and_arrives_once() {
    let route = straight_route(1_000.0);
    let polyline = route.polyline();
    let (mut controller, mut state) = navigating(route);
    let arrival_rx = state.streams.subscribe_arrival();

    let mut effects = Vec::new();
    for position in positions_along(&polyline, 20.0, 10.0, 1_000) {
        feed(&mut controller, &mut state, position);
        effects.extend(state.take_effects());
    }

    assert!(matches!(state.nav, NavigationState::Arrived { .. }));
    assert!(arrival_rx.borrow().is_some());
    assert!(effects
        .iter()
        .any(|e| matches!(e, NavEffect::Announce { .. })));
    assert!(effects
        .iter()
        .any(|e| matches!(e, NavEffect::UpdateProgressSplit { .. })));
    assert!(matches!(effects.last(), Some(NavEffect::CancelRouting)));
    assert!(state.streams.subscribe_instruction().borrow().is_some());
    assert!(state.streams.subscribe_camera().borrow().is_some());
}

#[test]
fn test_voice_disabled_suppresses_announce_effects_but_not_instructions() {
    let route = straight_route(1_000.0);
    let polyline = route.polyline();
    let (mut controller, mut state) = navigating(route);
    controller
        .handle_intent(&mut state, NavIntent::VoiceToggled { enabled: false })
        .unwrap();

    let mut effects = state.take_effects();
    for position in positions_along(&polyline, 20.0, 10.0, 1_000) {
        feed(&mut controller, &mut state, position);
        effects.extend(state.take_effects());
    }

    assert!(matches!(
        effects.first(),
        Some(NavEffect::SetVoiceEnabled { enabled: false })
    ));
    assert!(!effects
        .iter()
        .any(|e| matches!(e, NavEffect::Announce { .. })));
    assert!(state.streams.subscribe_instruction().borrow().is_some());
}

#[test]
fn test_three_deviations_request_single_reroute_and_swap_route() {
    let (mut controller, mut state) = navigating(straight_route(2_000.0));

    feed(&mut controller, &mut state, beside_route(0.0, 0.0, 1_000));
    for (i, along) in [50.0, 100.0, 150.0, 200.0].into_iter().enumerate() {
        feed(
            &mut controller,
            &mut state,
            beside_route(along, 80.0, 2_000 + i as u64 * 1_000),
        );
    }

    let effects = state.take_effects();
    let reroutes: Vec<_> = effects
        .iter()
        .filter_map(|e| match e {
            NavEffect::RequestReroute {
                generation,
                request,
            } => Some((*generation, request.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(reroutes.len(), 1, "genau eine Neuberechnung");
    let (generation, request) = &reroutes[0];
    assert_eq!(*generation, state.route_generation);
    assert!(state.off_route.is_in_flight());
    assert_eq!(request.leg_index, 0);
    assert_eq!(
        request.remaining_waypoints(),
        vec![destination_point(SF, 90.0, 2_000.0)]
    );

    let start = request.position.coordinate();
    let new_route = straight_route(500.0);
    let old_route = Arc::clone(state.route().unwrap());
    controller
        .handle_intent(
            &mut state,
            NavIntent::RerouteCompleted {
                generation: *generation,
                result: Ok(new_route),
            },
        )
        .unwrap();

    let current = state.route().unwrap();
    assert!(!Arc::ptr_eq(current, &old_route));
    assert!(!state.off_route.is_in_flight());
    assert!(matches!(
        state.nav,
        NavigationState::Navigating {
            reroute_error: None,
            ..
        }
    ));
    assert!(start.is_valid());
}

#[test]
fn test_reroute_failure_keeps_route_and_flags_state() {
    let (mut controller, mut state) = navigating(straight_route(2_000.0));
    for i in 0..3u64 {
        feed(
            &mut controller,
            &mut state,
            beside_route(50.0 * i as f64, 80.0, 1_000 + i * 1_000),
        );
    }
    let generation = state.route_generation;
    let old_route = Arc::clone(state.route().unwrap());

    controller
        .handle_intent(
            &mut state,
            NavIntent::RerouteCompleted {
                generation,
                result: Err(NavError::Routing("timeout".into())),
            },
        )
        .unwrap();

    assert!(Arc::ptr_eq(state.route().unwrap(), &old_route));
    match &state.nav {
        NavigationState::Navigating { reroute_error, .. } => {
            assert!(reroute_error.as_deref().is_some_and(|m| m.contains("timeout")));
        }
        other => panic!("Unerwarteter Zustand: {other:?}"),
    }
    assert!(!state.off_route.is_in_flight());
}

#[test]
fn test_pause_resume_and_ignored_positions_while_paused() {
    let (mut controller, mut state) = navigating(straight_route(1_000.0));
    feed(&mut controller, &mut state, beside_route(0.0, 0.0, 1_000));

    controller
        .handle_intent(&mut state, NavIntent::PauseRequested)
        .unwrap();
    assert!(matches!(state.nav, NavigationState::Paused { .. }));
    assert!(!state.tracker.is_tracking());

    let before = state.command_log.len();
    controller
        .handle_intent(
            &mut state,
            NavIntent::PositionReceived {
                position: beside_route(100.0, 0.0, 2_000),
            },
        )
        .unwrap();
    assert_eq!(state.command_log.len(), before);

    controller
        .handle_intent(&mut state, NavIntent::ResumeRequested { now_ms: 3_000 })
        .unwrap();
    assert!(state.nav.is_navigating());
    assert!(state.tracker.is_tracking());
}

#[test]
fn test_pause_from_idle_is_state_violation() {
    let mut controller = NavigationController::new();
    let mut state = SessionState::new(NavigationOptions::default());

    let pause = controller.handle_intent(&mut state, NavIntent::PauseRequested);
    let resume = controller.handle_intent(&mut state, NavIntent::ResumeRequested { now_ms: 0 });

    assert!(matches!(pause, Err(NavError::StateViolation(_))));
    assert!(matches!(resume, Err(NavError::StateViolation(_))));
}

#[test]
fn test_stop_clears_route_and_drops_late_results() {
    let (mut controller, mut state) = navigating(straight_route(1_000.0));
    feed(&mut controller, &mut state, beside_route(0.0, 0.0, 1_000));
    let stale_generation = state.route_generation;

    controller
        .handle_intent(&mut state, NavIntent::StopRequested)
        .unwrap();

    assert!(matches!(state.nav, NavigationState::Idle));
    assert!(state.streams.subscribe_progress().borrow().is_none());
    assert!(state.command_log.is_empty());
    let effects = state.take_effects();
    assert!(effects
        .iter()
        .any(|e| matches!(e, NavEffect::CancelRouting)));
    assert!(effects.iter().any(|e| matches!(e, NavEffect::ClearRoute)));

    controller
        .handle_intent(
            &mut state,
            NavIntent::RerouteCompleted {
                generation: stale_generation,
                result: Ok(straight_route(500.0)),
            },
        )
        .unwrap();
    assert!(matches!(state.nav, NavigationState::Idle));
}

#[test]
fn test_location_errors_by_severity() {
    let (mut controller, mut state) = navigating(straight_route(1_000.0));

    controller
        .handle_intent(
            &mut state,
            NavIntent::LocationFailed {
                error: LocationError::Unavailable("GPS-Signal verloren".into()),
            },
        )
        .unwrap();
    assert!(state.nav.is_navigating());
    assert!(matches!(
        state.streams.subscribe_error().borrow().clone(),
        Some(NavError::Location(LocationError::Unavailable(_)))
    ));

    controller
        .handle_intent(
            &mut state,
            NavIntent::LocationFailed {
                error: LocationError::PermissionDenied,
            },
        )
        .unwrap();
    assert!(matches!(state.nav, NavigationState::Error { .. }));
    assert!(state
        .take_effects()
        .iter()
        .any(|e| matches!(e, NavEffect::CancelRouting)));
}

#[test]
fn test_teleport_position_is_dropped() {
    let (mut controller, mut state) = navigating(straight_route(1_000.0));
    feed(&mut controller, &mut state, beside_route(0.0, 0.0, 1_000));
    let progress_before = state.tracker.last_progress().cloned();

    // 50 km in einer Sekunde
    let far = Position::at(destination_point(SF, 0.0, 50_000.0), 2_000).with_speed(10.0);
    feed(&mut controller, &mut state, far);

    assert_eq!(state.tracker.last_progress().cloned(), progress_before);
    assert!(state.nav.is_navigating());
}
