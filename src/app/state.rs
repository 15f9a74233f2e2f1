//! Navigationszustand und Sitzungsdaten.

use std::sync::Arc;

use super::broadcast::NavigationStreams;
use super::events::NavEffect;
use super::off_route::OffRoutePolicy;
use super::position_gate::PositionGate;
use super::throttle::BroadcastGate;
use super::tracker::ProgressTracker;
use super::CommandLog;
use crate::core::{CameraAnimator, CameraDynamics, CameraParameters, Position, RouteModel};
use crate::shared::NavigationOptions;

/// Zustand der Navigations-Zustandsmaschine
#[derive(Debug, Clone, Default)]
pub enum NavigationState {
    /// Keine Sitzung
    #[default]
    Idle,
    /// Initiale Route wird berechnet
    Calculating,
    /// Aktive Zielführung
    Navigating {
        /// Aktive Route
        route: Arc<RouteModel>,
        /// Letzte akzeptierte Position
        position: Option<Position>,
        /// Geschwindigkeit in m/s (0 wenn unbekannt)
        speed: f64,
        /// Fahrtrichtung in Grad
        bearing: Option<f64>,
        /// Gesetzt, wenn die letzte Neuberechnung fehlschlug
        reroute_error: Option<String>,
    },
    /// Pausiert; Route bleibt erhalten
    Paused {
        /// Aktive Route
        route: Arc<RouteModel>,
        /// Letzte bekannte Position
        position: Option<Position>,
    },
    /// Ziel erreicht
    Arrived {
        /// Abgeschlossene Route
        route: Arc<RouteModel>,
        /// Position bei Ankunft
        position: Position,
    },
    /// Unbehebbarer Fehler
    Error {
        /// Fehlermeldung
        message: String,
    },
}

impl NavigationState {
    /// Kurzname für Logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Calculating => "Calculating",
            Self::Navigating { .. } => "Navigating",
            Self::Paused { .. } => "Paused",
            Self::Arrived { .. } => "Arrived",
            Self::Error { .. } => "Error",
        }
    }

    /// Route des Zustands, falls vorhanden
    pub fn route(&self) -> Option<&Arc<RouteModel>> {
        match self {
            Self::Navigating { route, .. }
            | Self::Paused { route, .. }
            | Self::Arrived { route, .. } => Some(route),
            Self::Idle | Self::Calculating | Self::Error { .. } => None,
        }
    }

    /// Darf eine neue Navigation gestartet werden?
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Arrived { .. } | Self::Error { .. })
    }

    /// Aktive Zielführung?
    pub fn is_navigating(&self) -> bool {
        matches!(self, Self::Navigating { .. })
    }
}

/// Gesamter veränderlicher Zustand einer Sitzung.
///
/// Wird ausschließlich vom `NavigationController` verändert.
pub struct SessionState {
    /// Zustandsmaschine
    pub nav: NavigationState,
    /// Laufzeit-Optionen
    pub options: NavigationOptions,
    /// Fortschrittsverfolgung
    pub tracker: ProgressTracker,
    /// Neuberechnungs-Politik
    pub off_route: OffRoutePolicy,
    /// Positionsfilter
    pub gate: PositionGate,
    /// Ziel-Kameraparameter
    pub camera: CameraDynamics,
    /// Laufende Kamera-Animationen
    pub animator: CameraAnimator,
    /// Drossel für Navigating-Zustandsmeldungen
    pub state_gate: BroadcastGate,
    /// Drossel für die Routen-Visualisierung
    pub visual_gate: BroadcastGate,
    /// Generationszähler für Routing-Anfragen; ältere Ergebnisse werden verworfen
    pub route_generation: u64,
    /// Sprachansagen aktiv
    pub voice_enabled: bool,
    /// Verlauf ausgeführter Commands
    pub command_log: CommandLog,
    /// Ausstehende Effekte für Kollaborateure
    pub effects: Vec<NavEffect>,
    /// Ausgehende Streams
    pub streams: Arc<NavigationStreams>,
}

impl SessionState {
    /// Erstellt einen leeren Sitzungszustand aus den Optionen
    pub fn new(options: NavigationOptions) -> Self {
        Self::with_streams(options, Arc::new(NavigationStreams::new()))
    }

    /// Wie `new`, aber mit bereits existierenden Streams
    pub fn with_streams(options: NavigationOptions, streams: Arc<NavigationStreams>) -> Self {
        let b = &options.broadcast;
        Self {
            nav: NavigationState::Idle,
            tracker: ProgressTracker::new(options.tracker.clone(), options.arrival.clone()),
            off_route: OffRoutePolicy::new(options.off_route.clone(), options.route_profile),
            gate: PositionGate::new(&options.off_route),
            camera: CameraDynamics::new(options.camera.clone()),
            animator: CameraAnimator::new(initial_camera(&options)),
            state_gate: BroadcastGate::new(b.state_interval_ms, b.state_distance_m),
            visual_gate: BroadcastGate::new(b.visual_interval_ms, b.visual_distance_m),
            route_generation: 0,
            voice_enabled: options.voice_enabled,
            command_log: CommandLog::new(),
            effects: Vec::new(),
            streams,
            options,
        }
    }

    /// Entnimmt alle ausstehenden Effekte
    pub fn take_effects(&mut self) -> Vec<NavEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Aktive Route, falls vorhanden
    pub fn route(&self) -> Option<&Arc<RouteModel>> {
        self.nav.route()
    }

    /// Setzt den Zustand und veröffentlicht ihn ungedrosselt.
    pub fn set_nav(&mut self, nav: NavigationState) {
        if nav.name() != self.nav.name() {
            log::info!("Navigation: {} → {}", self.nav.name(), nav.name());
        }
        self.nav = nav;
        self.streams.publish_state(&self.nav);
    }
}

/// Ruhende Kamera: maximaler Zoom, minimaler Pitch, Norden oben.
fn initial_camera(options: &NavigationOptions) -> CameraParameters {
    CameraParameters {
        zoom: options.camera.zoom_max,
        pitch: options.camera.pitch_min,
        bearing: 0.0,
        animation_duration_ms: 0,
    }
}
