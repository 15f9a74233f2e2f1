use crate::app::routing::{RouteProfile, RouteRequest};
use crate::core::{CameraParameters, Position, RouteModel};
use crate::error::{LocationError, NavError};

/// Navigations-Intents.
/// Intents sind Eingaben von Aufrufer, Positionsquelle, Timern und
/// Routing-Tasks ohne direkte Mutationslogik.
#[derive(Debug, Clone)]
pub enum NavIntent {
    /// Navigation zu einem Ziel starten
    StartRequested { request: RouteRequest },
    /// Ergebnis der initialen Routenberechnung
    RouteCalculated {
        generation: u64,
        result: Result<RouteModel, NavError>,
        now_ms: u64,
    },
    /// Ergebnis einer Neuberechnung
    RerouteCompleted {
        generation: u64,
        result: Result<RouteModel, NavError>,
    },
    /// Neue Position aus der Ortungsquelle
    PositionReceived { position: Position },
    /// Positionsquelle meldet einen Fehler
    LocationFailed { error: LocationError },
    /// Navigation pausieren
    PauseRequested,
    /// Navigation fortsetzen
    ResumeRequested { now_ms: u64 },
    /// Navigation beenden
    StopRequested,
    /// Periodischer Fortschritts-Heartbeat
    HeartbeatTick { now_ms: u64 },
    /// Animations-Tick der Kamera
    CameraTick { now_ms: u64 },
    /// Sprachansagen ein-/ausschalten
    VoiceToggled { enabled: bool },
    /// Routenprofil geändert
    RouteProfileChanged { profile: RouteProfile },
    /// Renderer meldet seinen aktuellen Kamerazustand
    RendererCameraReported { params: CameraParameters },
}
