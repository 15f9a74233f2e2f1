//! Mapping von Navigations-Intents auf mutierende Commands.

use std::sync::Arc;

use super::state::{NavigationState, SessionState};
use super::{NavCommand, NavIntent};
use crate::core::AnimationKind;

/// Übersetzt einen `NavIntent` in eine Sequenz ausführbarer `NavCommand`s.
///
/// Veraltete Routing-Ergebnisse und Eingaben, die im aktuellen Zustand
/// keine Wirkung haben, ergeben eine leere Sequenz.
pub fn map_intent_to_commands(state: &SessionState, intent: NavIntent) -> Vec<NavCommand> {
    match intent {
        NavIntent::StartRequested { request } => vec![NavCommand::BeginCalculation { request }],
        NavIntent::RouteCalculated {
            generation,
            result,
            now_ms,
        } => {
            if generation != state.route_generation
                || !matches!(state.nav, NavigationState::Calculating)
            {
                log::debug!(
                    "Routenergebnis verworfen (Generation {generation}, aktuell {}, Zustand {})",
                    state.route_generation,
                    state.nav.name()
                );
                return vec![];
            }
            match result {
                Ok(route) => vec![NavCommand::ActivateRoute {
                    route: Arc::new(route),
                    now_ms,
                }],
                Err(error) => vec![NavCommand::FailNavigation { error }],
            }
        }
        NavIntent::RerouteCompleted { generation, result } => {
            let active = matches!(
                state.nav,
                NavigationState::Navigating { .. } | NavigationState::Paused { .. }
            );
            if generation != state.route_generation || !active {
                log::debug!(
                    "Neuberechnung verworfen (Generation {generation}, aktuell {}, Zustand {})",
                    state.route_generation,
                    state.nav.name()
                );
                return vec![];
            }
            match result {
                Ok(route) => vec![NavCommand::ApplyReroute {
                    route: Arc::new(route),
                }],
                Err(error) => vec![NavCommand::RecordRerouteFailure { error }],
            }
        }
        NavIntent::PositionReceived { position } => {
            if state.nav.is_navigating() {
                vec![NavCommand::ProcessPosition { position }]
            } else {
                vec![]
            }
        }
        NavIntent::LocationFailed { error } => vec![NavCommand::HandleLocationError { error }],
        NavIntent::PauseRequested => vec![NavCommand::Pause],
        NavIntent::ResumeRequested { now_ms } => vec![NavCommand::Resume { now_ms }],
        NavIntent::StopRequested => vec![NavCommand::Stop],
        NavIntent::HeartbeatTick { now_ms } => {
            if state.nav.is_navigating() && state.tracker.last_progress().is_some() {
                vec![NavCommand::EmitHeartbeat { now_ms }]
            } else {
                vec![]
            }
        }
        NavIntent::CameraTick { now_ms } => {
            if state.animator.is_animating(AnimationKind::Bearing)
                || state.animator.is_animating(AnimationKind::ZoomPitch)
            {
                vec![NavCommand::AdvanceCamera { now_ms }]
            } else {
                vec![]
            }
        }
        NavIntent::VoiceToggled { enabled } => vec![NavCommand::SetVoiceEnabled { enabled }],
        NavIntent::RouteProfileChanged { profile } => {
            vec![NavCommand::SetRouteProfile { profile }]
        }
        NavIntent::RendererCameraReported { params } => vec![NavCommand::SyncCamera { params }],
    }
}

#[cfg(test)]
mod tests;
