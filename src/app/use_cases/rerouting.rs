//! Use-Cases der Neuberechnung bei Routenabweichung.

use std::sync::Arc;

use crate::app::events::NavEffect;
use crate::app::off_route::RerouteDecision;
use crate::app::routing::RerouteRequest;
use crate::app::state::{NavigationState, SessionState};
use crate::app::tracker::RouteDeviation;
use crate::core::RouteModel;
use crate::error::NavError;

/// Leitet eine Abweichung an die Policy weiter und fordert ggf. eine
/// Neuberechnung an.
pub fn on_deviation(state: &mut SessionState, route: &Arc<RouteModel>, deviation: &RouteDeviation) {
    match state.off_route.on_deviation(deviation) {
        RerouteDecision::Reroute { from, profile } => {
            let leg_index = state
                .tracker
                .last_progress()
                .map_or(0, |progress| progress.leg_index);
            state.route_generation += 1;
            state.effects.push(NavEffect::RequestReroute {
                generation: state.route_generation,
                request: RerouteRequest {
                    position: from,
                    previous: Arc::clone(route),
                    leg_index,
                    profile,
                },
            });
        }
        RerouteDecision::Counting(n) => {
            log::debug!(
                "Abweichung {n} ({:.0} m neben der Route)",
                deviation.distance_from_route
            );
        }
        RerouteDecision::Suppressed(reason) => {
            log::debug!("Abweichung ohne Neuberechnung: {reason:?}");
        }
    }
}

/// Tauscht die Route nach erfolgreicher Neuberechnung aus.
///
/// Fortschritt, Ansagen und Drosseln beginnen für die neue Route von vorn.
pub fn apply_reroute(state: &mut SessionState, route: Arc<RouteModel>) {
    state.off_route.reroute_finished();
    let next = match &state.nav {
        NavigationState::Navigating {
            position,
            speed,
            bearing,
            ..
        } => NavigationState::Navigating {
            route: Arc::clone(&route),
            position: *position,
            speed: *speed,
            bearing: *bearing,
            reroute_error: None,
        },
        NavigationState::Paused { position, .. } => NavigationState::Paused {
            route: Arc::clone(&route),
            position: *position,
        },
        other => {
            log::error!("Neuberechnung im Zustand {} erhalten", other.name());
            return;
        }
    };

    log::info!(
        "Neue Route übernommen: {:.0} m, {} Steps",
        route.total_distance(),
        route.step_count()
    );
    state.tracker.replace_route();
    state.state_gate.reset();
    state.visual_gate.reset();
    state.streams.publish_error(None);
    state.streams.publish_maneuver(None);
    state.effects.push(NavEffect::ShowRoute {
        route: Arc::clone(&route),
    });
    state.effects.push(NavEffect::UpdateProgressSplit {
        traveled: Vec::new(),
        remaining: route.polyline(),
    });
    state.set_nav(next);
}

/// Neuberechnung fehlgeschlagen: alte Route bleibt, der Fehler wird
/// am Navigating-Zustand vermerkt. Kein automatischer Neuversuch.
pub fn record_reroute_failure(state: &mut SessionState, error: NavError) {
    state.off_route.reroute_finished();
    log::warn!("Neuberechnung fehlgeschlagen: {error}");
    state.streams.publish_error(Some(error.clone()));
    if let NavigationState::Navigating { reroute_error, .. } = &mut state.nav {
        *reroute_error = Some(error.to_string());
        state.streams.publish_state(&state.nav);
    }
}
