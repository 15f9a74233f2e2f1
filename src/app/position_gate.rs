//! Plausibilitätsprüfung eingehender Positionen vor der Verarbeitung.

use crate::core::Position;
use crate::shared::geo::haversine_distance;
use crate::shared::OffRouteOptions;

/// Grund für eine verworfene Position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionRejection {
    /// NaN oder Unendlich in Koordinaten
    NotFinite,
    /// Breite/Länge außerhalb des gültigen Bereichs
    OutOfRange,
    /// Implizite Geschwindigkeit zur letzten guten Position zu hoch
    Teleport {
        /// Berechnete Geschwindigkeit in m/s
        implied_speed_mps: f64,
    },
    /// Sprung auf (0,0) aus großer Entfernung
    NullIsland {
        /// Entfernung zur letzten guten Position
        jump_m: f64,
    },
}

/// Filtert unplausible Positionen; merkt sich die letzte akzeptierte.
#[derive(Debug, Clone)]
pub struct PositionGate {
    max_speed_mps: f64,
    null_island_jump_m: f64,
    last_good: Option<Position>,
}

impl PositionGate {
    /// Erstellt das Gate mit den Grenzen aus den Off-Route-Optionen
    pub fn new(options: &OffRouteOptions) -> Self {
        Self {
            max_speed_mps: options.max_plausible_speed_mps,
            null_island_jump_m: options.null_island_jump_m,
            last_good: None,
        }
    }

    /// Letzte akzeptierte Position
    pub fn last_good(&self) -> Option<&Position> {
        self.last_good.as_ref()
    }

    /// Vergisst die letzte Position (neue Sitzung)
    pub fn reset(&mut self) {
        self.last_good = None;
    }

    /// Prüft eine Position und übernimmt sie bei Erfolg als letzte gute.
    pub fn check(&mut self, position: &Position) -> Result<(), PositionRejection> {
        if !position.latitude.is_finite() || !position.longitude.is_finite() {
            return Err(PositionRejection::NotFinite);
        }
        if !position.coordinate().is_valid() {
            return Err(PositionRejection::OutOfRange);
        }

        if let Some(last) = &self.last_good {
            let distance = haversine_distance(last.coordinate(), position.coordinate());

            let at_null_island = position.latitude == 0.0 && position.longitude == 0.0;
            if at_null_island && distance > self.null_island_jump_m {
                return Err(PositionRejection::NullIsland { jump_m: distance });
            }

            // dt <= 0 (doppelte/vertauschte Zeitstempel) zählt als 1 s
            let dt_ms = position.timestamp_ms.saturating_sub(last.timestamp_ms);
            let dt_s = if dt_ms == 0 { 1.0 } else { dt_ms as f64 / 1000.0 };
            let implied = distance / dt_s;
            if implied > self.max_speed_mps {
                return Err(PositionRejection::Teleport {
                    implied_speed_mps: implied,
                });
            }
        }

        self.last_good = Some(*position);
        Ok(())
    }
}
