//! Use-Cases für den Lebenszyklus einer Navigationssitzung.

use std::sync::Arc;

use crate::app::events::NavEffect;
use crate::app::routing::{RouteProfile, RouteRequest};
use crate::app::state::{NavigationState, SessionState};
use crate::core::RouteModel;
use crate::error::NavError;

/// Startet die Routenberechnung.
///
/// Nur aus `Idle`, `Arrived` oder `Error` erlaubt.
pub fn begin_calculation(state: &mut SessionState, request: RouteRequest) -> Result<(), NavError> {
    if !state.nav.can_start() {
        return Err(NavError::StateViolation(format!(
            "Navigation kann im Zustand {} nicht gestartet werden",
            state.nav.name()
        )));
    }
    request.validate()?;

    reset_session(state);
    state.off_route.set_profile(request.options.profile);
    state.route_generation += 1;
    log::info!(
        "Routenberechnung gestartet ({} Zwischenziele, Profil {:?})",
        request.waypoints.len(),
        request.options.profile
    );
    state.set_nav(NavigationState::Calculating);
    state.effects.push(NavEffect::RequestRoute {
        generation: state.route_generation,
        request,
    });
    Ok(())
}

/// Übernimmt die berechnete Route und startet die Zielführung.
pub fn activate_route(state: &mut SessionState, route: Arc<RouteModel>, now_ms: u64) {
    log::info!(
        "Route aktiv: {:.0} m, {:.0} s, {} Legs, {} Steps",
        route.total_distance(),
        route.total_duration(),
        route.legs().len(),
        route.step_count()
    );
    state.tracker.start_tracking(now_ms);
    state.camera.reset();

    state.effects.push(NavEffect::ShowRoute {
        route: Arc::clone(&route),
    });
    state.effects.push(NavEffect::UpdateProgressSplit {
        traveled: Vec::new(),
        remaining: route.polyline(),
    });
    state.set_nav(NavigationState::Navigating {
        route,
        position: None,
        speed: 0.0,
        bearing: None,
        reroute_error: None,
    });
}

/// Initiale Berechnung fehlgeschlagen: Zustand `Error`.
pub fn fail_navigation(state: &mut SessionState, error: NavError) {
    log::warn!("Navigation fehlgeschlagen: {error}");
    log::debug!("Letzte Commands: {:?}", state.command_log.recent(8));
    state.tracker.stop_tracking();
    state.effects.push(NavEffect::CancelRouting);
    state.streams.publish_error(Some(error.clone()));
    state.set_nav(NavigationState::Error {
        message: error.to_string(),
    });
}

/// Navigating → Paused
pub fn pause(state: &mut SessionState) -> Result<(), NavError> {
    let NavigationState::Navigating {
        route, position, ..
    } = &state.nav
    else {
        return Err(NavError::StateViolation(format!(
            "Pause im Zustand {} nicht möglich",
            state.nav.name()
        )));
    };
    let paused = NavigationState::Paused {
        route: Arc::clone(route),
        position: *position,
    };
    state.tracker.stop_tracking();
    state.animator.cancel_all();
    state.set_nav(paused);
    Ok(())
}

/// Paused → Navigating; die Verfolgung beginnt neu ab `now_ms`.
pub fn resume(state: &mut SessionState, now_ms: u64) -> Result<(), NavError> {
    let NavigationState::Paused { route, position } = &state.nav else {
        return Err(NavError::StateViolation(format!(
            "Fortsetzen im Zustand {} nicht möglich",
            state.nav.name()
        )));
    };
    let navigating = NavigationState::Navigating {
        route: Arc::clone(route),
        position: *position,
        speed: position.and_then(|p| p.speed).unwrap_or(0.0),
        bearing: position.and_then(|p| p.heading),
        reroute_error: None,
    };
    state.tracker.start_tracking(now_ms);
    state.state_gate.reset();
    state.visual_gate.reset();
    state.set_nav(navigating);
    Ok(())
}

/// Beendet alles: Anfragen abbrechen, Route entfernen, zurück nach `Idle`.
pub fn stop(state: &mut SessionState) {
    state.route_generation += 1;
    state.effects.push(NavEffect::CancelRouting);
    if state.route().is_some() {
        state.effects.push(NavEffect::ClearRoute);
    }
    reset_session(state);
    state.command_log.clear();
    state.set_nav(NavigationState::Idle);
}

/// Sprachansagen schalten
pub fn set_voice_enabled(state: &mut SessionState, enabled: bool) {
    state.voice_enabled = enabled;
    state.options.voice_enabled = enabled;
    state.effects.push(NavEffect::SetVoiceEnabled { enabled });
}

/// Routenprofil für künftige Berechnungen setzen
pub fn set_route_profile(state: &mut SessionState, profile: RouteProfile) {
    log::info!("Routenprofil: {:?}", profile);
    state.options.route_profile = profile;
    state.off_route.set_profile(profile);
}

/// Verwirft alle routenbezogenen Zustände und Stream-Werte.
fn reset_session(state: &mut SessionState) {
    state.tracker.stop_tracking();
    state.off_route.reset();
    state.gate.reset();
    state.camera.reset();
    state.animator.cancel_all();
    state.state_gate.reset();
    state.visual_gate.reset();
    state.streams.clear_session();
    state.streams.publish_error(None);
}
