use std::sync::Arc;

use crate::app::routing::{RouteProfile, RouteRequest};
use crate::core::{CameraParameters, Position, RouteModel};
use crate::error::{LocationError, NavError};

/// Commands sind mutierende Schritte, die zentral ausgeführt werden.
#[derive(Debug, Clone)]
pub enum NavCommand {
    /// Routenberechnung anstoßen (Idle/Arrived/Error → Calculating)
    BeginCalculation { request: RouteRequest },
    /// Berechnete Route aktivieren (Calculating → Navigating)
    ActivateRoute { route: Arc<RouteModel>, now_ms: u64 },
    /// Unbehebbarer Fehler (→ Error)
    FailNavigation { error: NavError },
    /// Neu berechnete Route übernehmen
    ApplyReroute { route: Arc<RouteModel> },
    /// Fehlgeschlagene Neuberechnung am Navigating-Zustand vermerken
    RecordRerouteFailure { error: NavError },
    /// Position verarbeiten
    ProcessPosition { position: Position },
    /// Fehler der Positionsquelle behandeln
    HandleLocationError { error: LocationError },
    /// Navigating → Paused
    Pause,
    /// Paused → Navigating
    Resume { now_ms: u64 },
    /// Alles beenden (→ Idle)
    Stop,
    /// Fortschritt per Heartbeat prüfen
    EmitHeartbeat { now_ms: u64 },
    /// Kamera-Animationen fortschreiben
    AdvanceCamera { now_ms: u64 },
    /// Sprachansagen setzen
    SetVoiceEnabled { enabled: bool },
    /// Routenprofil setzen
    SetRouteProfile { profile: RouteProfile },
    /// Kamera-Startwert vom Renderer übernehmen
    SyncCamera { params: CameraParameters },
}

impl NavCommand {
    /// Kurzname ohne Nutzdaten, für Log und Diagnose
    pub fn kind(&self) -> &'static str {
        match self {
            NavCommand::BeginCalculation { .. } => "begin_calculation",
            NavCommand::ActivateRoute { .. } => "activate_route",
            NavCommand::FailNavigation { .. } => "fail_navigation",
            NavCommand::ApplyReroute { .. } => "apply_reroute",
            NavCommand::RecordRerouteFailure { .. } => "record_reroute_failure",
            NavCommand::ProcessPosition { .. } => "process_position",
            NavCommand::HandleLocationError { .. } => "handle_location_error",
            NavCommand::Pause => "pause",
            NavCommand::Resume { .. } => "resume",
            NavCommand::Stop => "stop",
            NavCommand::EmitHeartbeat { .. } => "emit_heartbeat",
            NavCommand::AdvanceCamera { .. } => "advance_camera",
            NavCommand::SetVoiceEnabled { .. } => "set_voice_enabled",
            NavCommand::SetRouteProfile { .. } => "set_route_profile",
            NavCommand::SyncCamera { .. } => "sync_camera",
        }
    }
}
