//! Use-Cases der laufenden Zielführung: Positionen, Ortungsfehler, Heartbeat.

use std::sync::Arc;

use super::{camera, rerouting};
use crate::app::events::NavEffect;
use crate::app::state::{NavigationState, SessionState};
use crate::core::Position;
use crate::error::{LocationError, NavError};

/// Verarbeitet eine Position während `Navigating`.
///
/// Reihenfolge: Filter, Fortschritt, Visualisierung, Abweichung, Ansage,
/// Ankunft, Zustandsmeldung, Kamera.
pub fn process_position(state: &mut SessionState, position: Position) {
    let NavigationState::Navigating {
        route,
        bearing,
        reroute_error,
        ..
    } = &state.nav
    else {
        return;
    };
    let route = Arc::clone(route);
    let last_bearing = *bearing;
    let reroute_error = reroute_error.clone();

    let previous = state.gate.last_good().copied();
    if let Err(reason) = state.gate.check(&position) {
        log::debug!("Position verworfen: {reason:?}");
        return;
    }
    let speed = position.speed_or_derived(previous.as_ref()).unwrap_or(0.0);

    let out = state.tracker.update(&route, &position);
    let Some(progress) = out.progress else {
        return;
    };

    if out.emit_progress {
        state.streams.publish_progress(Some(progress.clone()));
    }
    state.streams.publish_maneuver(progress.upcoming.clone());

    if progress.on_route {
        state.off_route.on_route(&position);
    }

    if state
        .visual_gate
        .should_emit(position.timestamp_ms, progress.location)
    {
        if let Some(snap) = route.snap(progress.location) {
            let (traveled, remaining) = route.split_polyline(&snap);
            state
                .effects
                .push(NavEffect::UpdateProgressSplit { traveled, remaining });
        }
    }

    if let Some(deviation) = out.deviation {
        rerouting::on_deviation(state, &route, &deviation);
    }

    if let Some(announcement) = out.announcement {
        log::info!("Ansage: {}", announcement.text);
        state.streams.publish_instruction(announcement.text.clone());
        if state.voice_enabled {
            state.effects.push(NavEffect::Announce {
                text: announcement.text,
            });
        }
    }

    if let Some(arrival) = out.arrival {
        state.streams.publish_arrival(arrival);
        state.tracker.stop_tracking();
        state.effects.push(NavEffect::CancelRouting);
        state.set_nav(NavigationState::Arrived {
            route,
            position: arrival.position,
        });
        return;
    }

    state.nav = NavigationState::Navigating {
        route,
        position: Some(position),
        speed,
        bearing: position.heading.or(last_bearing),
        reroute_error,
    };
    if state
        .state_gate
        .should_emit(position.timestamp_ms, progress.location)
    {
        state.streams.publish_state(&state.nav);
    }

    camera::update_target(
        state,
        &position,
        progress.upcoming.as_ref(),
        position.timestamp_ms,
    );
}

/// Fehler der Positionsquelle.
///
/// Vorübergehende Ausfälle werden nur gemeldet; fehlende Berechtigung
/// oder ein abgeschalteter Dienst beenden die Zielführung mit `Error`.
pub fn handle_location_error(state: &mut SessionState, error: LocationError) {
    log::warn!("Positionsquelle: {error}");
    let recoverable = error.is_recoverable();
    state.streams.publish_error(Some(NavError::Location(error.clone())));
    if recoverable {
        return;
    }
    let active = matches!(
        state.nav,
        NavigationState::Calculating
            | NavigationState::Navigating { .. }
            | NavigationState::Paused { .. }
    );
    if active {
        state.route_generation += 1;
        state.tracker.stop_tracking();
        state.animator.cancel_all();
        state.effects.push(NavEffect::CancelRouting);
        state.set_nav(NavigationState::Error {
            message: NavError::Location(error).to_string(),
        });
    }
}

/// Heartbeat: meldet leichte Fortschrittsänderungen auch ohne neue Position.
pub fn emit_heartbeat(state: &mut SessionState, now_ms: u64) {
    if let Some(progress) = state.tracker.heartbeat(now_ms) {
        state.streams.publish_progress(Some(progress));
    }
}
