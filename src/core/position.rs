//! Positions-Fix aus der externen Ortungsquelle.

use serde::{Deserialize, Serialize};

use crate::shared::geo::{self, Coordinate};

/// Einzelner Positions-Fix. Unveränderlicher Wert.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Breite in Grad
    pub latitude: f64,
    /// Länge in Grad
    pub longitude: f64,
    /// Fahrtrichtung in Grad [0, 360)
    #[serde(default)]
    pub heading: Option<f64>,
    /// Geschwindigkeit in m/s
    #[serde(default)]
    pub speed: Option<f64>,
    /// Horizontale Genauigkeit in Metern
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Höhe in Metern
    #[serde(default)]
    pub altitude: Option<f64>,
    /// Zeitstempel in Millisekunden
    pub timestamp_ms: u64,
}

impl Position {
    /// Erstellt einen Fix ohne optionale Messwerte
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: u64) -> Self {
        Self {
            latitude,
            longitude,
            heading: None,
            speed: None,
            accuracy: None,
            altitude: None,
            timestamp_ms,
        }
    }

    /// Erstellt einen Fix an einer Koordinate
    pub fn at(coordinate: Coordinate, timestamp_ms: u64) -> Self {
        Self::new(coordinate.lat, coordinate.lon, timestamp_ms)
    }

    /// Setzt die Geschwindigkeit (m/s)
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Setzt die Fahrtrichtung (Grad)
    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(geo::normalize_angle(heading));
        self
    }

    /// Koordinate des Fixes
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Luftlinie zu einem anderen Fix in Metern
    pub fn distance_to(&self, other: &Position) -> f64 {
        geo::haversine_distance(self.coordinate(), other.coordinate())
    }

    /// Geschwindigkeit des Fixes oder, falls nicht gemessen, aus dem Vorgänger abgeleitet.
    pub fn speed_or_derived(&self, previous: Option<&Position>) -> Option<f64> {
        if let Some(speed) = self.speed.filter(|s| s.is_finite() && *s >= 0.0) {
            return Some(speed);
        }
        let prev = previous?;
        let dt_ms = self.timestamp_ms.checked_sub(prev.timestamp_ms)?;
        if dt_ms == 0 {
            return None;
        }
        Some(self.distance_to(prev) / (dt_ms as f64 / 1000.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn derived_speed_uses_previous_fix() {
        let a = Position::new(0.0, 0.0, 0);
        let b = Position::at(geo::destination_point(a.coordinate(), 90.0, 20.0), 2_000);
        assert_relative_eq!(b.speed_or_derived(Some(&a)).unwrap(), 10.0, epsilon = 1e-6);
    }

    #[test]
    fn measured_speed_wins() {
        let a = Position::new(0.0, 0.0, 0);
        let b = Position::new(0.0, 0.001, 1_000).with_speed(3.0);
        assert_eq!(b.speed_or_derived(Some(&a)), Some(3.0));
    }

    #[test]
    fn no_speed_without_time_delta() {
        let a = Position::new(0.0, 0.0, 1_000);
        let b = Position::new(0.0, 0.001, 1_000);
        assert_eq!(b.speed_or_derived(Some(&a)), None);
        assert_eq!(b.speed_or_derived(None), None);
    }

    #[test]
    fn heading_is_normalized() {
        let p = Position::new(0.0, 0.0, 0).with_heading(-90.0);
        assert_eq!(p.heading, Some(270.0));
    }
}
