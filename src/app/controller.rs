//! Navigation Controller für zentrale Event-Verarbeitung.

use super::state::SessionState;
use super::{NavCommand, NavIntent};
use crate::error::NavError;

/// Orchestriert Intents und Use-Cases auf den `SessionState`.
///
/// Einziger Schreiber des Sitzungszustands; Effekte landen im Outbox
/// `SessionState::effects`.
#[derive(Default)]
pub struct NavigationController;

impl NavigationController {
    /// Erstellt einen neuen Controller.
    pub fn new() -> Self {
        Self
    }

    /// Verarbeitet einen Intent über Intent->Command Mapping.
    pub fn handle_intent(
        &mut self,
        state: &mut SessionState,
        intent: NavIntent,
    ) -> Result<(), NavError> {
        let commands = self.map_intent_to_commands(state, intent);
        for command in commands {
            self.handle_command(state, command)?;
        }

        Ok(())
    }

    fn map_intent_to_commands(&self, state: &SessionState, intent: NavIntent) -> Vec<NavCommand> {
        super::intent_mapping::map_intent_to_commands(state, intent)
    }

    /// Führt mutierende Commands auf dem `SessionState` aus.
    /// Dispatcht an die Use-Cases in `use_cases/`.
    pub fn handle_command(
        &mut self,
        state: &mut SessionState,
        command: NavCommand,
    ) -> Result<(), NavError> {
        state.command_log.record(&command);
        use super::use_cases;

        match command {
            // === Lebenszyklus ===
            NavCommand::BeginCalculation { request } => {
                use_cases::lifecycle::begin_calculation(state, request)?
            }
            NavCommand::ActivateRoute { route, now_ms } => {
                use_cases::lifecycle::activate_route(state, route, now_ms)
            }
            NavCommand::FailNavigation { error } => {
                use_cases::lifecycle::fail_navigation(state, error)
            }
            NavCommand::Pause => use_cases::lifecycle::pause(state)?,
            NavCommand::Resume { now_ms } => use_cases::lifecycle::resume(state, now_ms)?,
            NavCommand::Stop => use_cases::lifecycle::stop(state),
            NavCommand::SetVoiceEnabled { enabled } => {
                use_cases::lifecycle::set_voice_enabled(state, enabled)
            }
            NavCommand::SetRouteProfile { profile } => {
                use_cases::lifecycle::set_route_profile(state, profile)
            }

            // === Zielführung ===
            NavCommand::ProcessPosition { position } => {
                use_cases::guidance::process_position(state, position)
            }
            NavCommand::HandleLocationError { error } => {
                use_cases::guidance::handle_location_error(state, error)
            }
            NavCommand::EmitHeartbeat { now_ms } => {
                use_cases::guidance::emit_heartbeat(state, now_ms)
            }

            // === Neuberechnung ===
            NavCommand::ApplyReroute { route } => use_cases::rerouting::apply_reroute(state, route),
            NavCommand::RecordRerouteFailure { error } => {
                use_cases::rerouting::record_reroute_failure(state, error)
            }

            // === Kamera ===
            NavCommand::AdvanceCamera { now_ms } => {
                use_cases::camera::advance_camera(state, now_ms)
            }
            NavCommand::SyncCamera { params } => use_cases::camera::sync_camera(state, params),
        }

        Ok(())
    }
}
