use std::sync::Arc;

use crate::app::routing::{RouteOptions, RouteProfile, RouteRequest};
use crate::app::state::{NavigationState, SessionState};
use crate::app::{NavCommand, NavIntent};
use crate::core::{Leg, Maneuver, ManeuverKind, Position, RouteModel, Step};
use crate::error::NavError;
use crate::shared::geo::{destination_point, Coordinate};
use crate::shared::NavigationOptions;

use super::map_intent_to_commands;

fn origin() -> Coordinate {
    Coordinate::new(37.7749, -122.4194)
}

fn straight_route() -> RouteModel {
    let a = origin();
    let b = destination_point(a, 90.0, 500.0);
    RouteModel::new(vec![Leg {
        steps: vec![
            Step {
                maneuver: Maneuver::new(ManeuverKind::Depart, a),
                distance: crate::shared::geo::haversine_distance(a, b),
                duration: 50.0,
                geometry: vec![a, b],
                name: None,
            },
            Step {
                maneuver: Maneuver::new(ManeuverKind::Arrive, b),
                distance: 0.0,
                duration: 0.0,
                geometry: vec![b],
                name: None,
            },
        ],
        summary: None,
    }])
    .unwrap()
}

fn request() -> RouteRequest {
    RouteRequest {
        origin: origin(),
        destination: destination_point(origin(), 90.0, 500.0),
        waypoints: vec![],
        options: RouteOptions::default(),
    }
}

fn calculating_state(generation: u64) -> SessionState {
    let mut state = SessionState::new(NavigationOptions::default());
    state.nav = NavigationState::Calculating;
    state.route_generation = generation;
    state
}

fn navigating_state() -> SessionState {
    let mut state = SessionState::new(NavigationOptions::default());
    state.nav = NavigationState::Navigating {
        route: Arc::new(straight_route()),
        position: None,
        speed: 0.0,
        bearing: None,
        reroute_error: None,
    };
    state.route_generation = 2;
    state
}

#[test]
fn start_requested_maps_to_begin_calculation() {
    let state = SessionState::new(NavigationOptions::default());

    let commands = map_intent_to_commands(
        &state,
        NavIntent::StartRequested { request: request() },
    );

    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], NavCommand::BeginCalculation { .. }));
}

#[test]
fn route_calculated_with_current_generation_activates_route() {
    let state = calculating_state(3);

    let commands = map_intent_to_commands(
        &state,
        NavIntent::RouteCalculated {
            generation: 3,
            result: Ok(straight_route()),
            now_ms: 1_000,
        },
    );

    assert_eq!(commands.len(), 1);
    assert!(matches!(
        commands[0],
        NavCommand::ActivateRoute { now_ms: 1_000, .. }
    ));
}

#[test]
fn route_calculated_failure_maps_to_fail_navigation() {
    let state = calculating_state(1);

    let commands = map_intent_to_commands(
        &state,
        NavIntent::RouteCalculated {
            generation: 1,
            result: Err(NavError::Routing("timeout".into())),
            now_ms: 0,
        },
    );

    assert_eq!(commands.len(), 1);
    assert!(matches!(
        commands[0],
        NavCommand::FailNavigation {
            error: NavError::Routing(_)
        }
    ));
}

#[test]
fn stale_route_result_is_dropped() {
    let state = calculating_state(5);

    let commands = map_intent_to_commands(
        &state,
        NavIntent::RouteCalculated {
            generation: 4,
            result: Ok(straight_route()),
            now_ms: 0,
        },
    );

    assert!(commands.is_empty());
}

#[test]
fn route_result_after_stop_is_dropped() {
    let mut state = calculating_state(1);
    state.nav = NavigationState::Idle;

    let commands = map_intent_to_commands(
        &state,
        NavIntent::RouteCalculated {
            generation: 1,
            result: Ok(straight_route()),
            now_ms: 0,
        },
    );

    assert!(commands.is_empty());
}

#[test]
fn reroute_result_maps_by_outcome() {
    let state = navigating_state();

    let ok = map_intent_to_commands(
        &state,
        NavIntent::RerouteCompleted {
            generation: 2,
            result: Ok(straight_route()),
        },
    );
    let err = map_intent_to_commands(
        &state,
        NavIntent::RerouteCompleted {
            generation: 2,
            result: Err(NavError::Routing("503".into())),
        },
    );
    let stale = map_intent_to_commands(
        &state,
        NavIntent::RerouteCompleted {
            generation: 1,
            result: Ok(straight_route()),
        },
    );

    assert!(matches!(ok[0], NavCommand::ApplyReroute { .. }));
    assert!(matches!(err[0], NavCommand::RecordRerouteFailure { .. }));
    assert!(stale.is_empty());
}

#[test]
fn positions_are_ignored_unless_navigating() {
    let idle = SessionState::new(NavigationOptions::default());
    let navigating = navigating_state();
    let position = Position::at(origin(), 1_000);

    assert!(map_intent_to_commands(&idle, NavIntent::PositionReceived { position }).is_empty());
    let commands = map_intent_to_commands(&navigating, NavIntent::PositionReceived { position });
    assert!(matches!(commands[0], NavCommand::ProcessPosition { .. }));
}

#[test]
fn heartbeat_without_progress_is_dropped() {
    let state = navigating_state();

    let commands = map_intent_to_commands(&state, NavIntent::HeartbeatTick { now_ms: 2_000 });

    assert!(commands.is_empty());
}

#[test]
fn camera_tick_without_animation_is_dropped() {
    let state = navigating_state();

    let commands = map_intent_to_commands(&state, NavIntent::CameraTick { now_ms: 100 });

    assert!(commands.is_empty());
}

#[test]
fn settings_intents_map_one_to_one() {
    let state = SessionState::new(NavigationOptions::default());

    let voice = map_intent_to_commands(&state, NavIntent::VoiceToggled { enabled: false });
    let profile = map_intent_to_commands(
        &state,
        NavIntent::RouteProfileChanged {
            profile: RouteProfile::TollFree,
        },
    );

    assert!(matches!(
        voice[0],
        NavCommand::SetVoiceEnabled { enabled: false }
    ));
    assert!(matches!(
        profile[0],
        NavCommand::SetRouteProfile {
            profile: RouteProfile::TollFree
        }
    ));
}
