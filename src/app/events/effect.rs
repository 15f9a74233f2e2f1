use std::sync::Arc;

use crate::app::routing::{RerouteRequest, RouteRequest};
use crate::core::{CameraParameters, RouteModel};
use crate::shared::geo::Coordinate;

/// Effekte für externe Kollaborateure.
/// Der Controller sammelt sie im Outbox des `SessionState`; die Sitzung
/// (oder ein Test) arbeitet sie nach jedem Intent ab.
#[derive(Debug, Clone)]
pub enum NavEffect {
    /// Initiale Route beim Provider anfragen
    RequestRoute {
        generation: u64,
        request: RouteRequest,
    },
    /// Neuberechnung beim Provider anfragen
    RequestReroute {
        generation: u64,
        request: RerouteRequest,
    },
    /// Laufende Routing-Anfragen abbrechen
    CancelRouting,
    /// Text ansagen
    Announce { text: String },
    /// Sprachausgabe schalten
    SetVoiceEnabled { enabled: bool },
    /// Route und Marker anzeigen
    ShowRoute { route: Arc<RouteModel> },
    /// Route und Marker entfernen
    ClearRoute,
    /// Gefahrene / verbleibende Polyline aktualisieren
    UpdateProgressSplit {
        traveled: Vec<Coordinate>,
        remaining: Vec<Coordinate>,
    },
    /// Kamera-Parameter anwenden
    ApplyCamera(CameraParameters),
}
