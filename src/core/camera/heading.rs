//! Glättung und Vorhersage der Kamera-Peilung.

use std::collections::VecDeque;

use crate::shared::geo::{heading_diff, normalize_angle};

/// Anzahl gespeicherter Headings.
const HISTORY_LEN: usize = 5;
/// Vorhersage-Horizont in Sekunden.
const PREDICTION_SECONDS: f64 = 0.5;
/// Ab dieser Winkelgeschwindigkeit (°/s) wird vorhergesagt.
const PREDICTION_MIN_RATE: f64 = 10.0;
/// Maximale Drehrate (°/s).
const MAX_TURN_RATE: f64 = 180.0;
/// Grunddauer einer Peilungsanimation.
const BASE_DURATION_MS: f64 = 300.0;
/// Zusatzdauer für eine 180°-Drehung.
const TURN_DURATION_MS: f64 = 900.0;
/// Untere Grenze des Geschwindigkeitsfaktors.
const MIN_SPEED_FACTOR: f64 = 0.3;
/// Bereich der Animationsdauer.
const DURATION_RANGE_MS: (f64, f64) = (150.0, 2_000.0);

/// Ergebnis eines Glättungsschritts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedHeading {
    /// Neue Kamera-Peilung in [0, 360)
    pub bearing: f64,
    /// Geschätzte Winkelgeschwindigkeit (°/s, positiv = im Uhrzeigersinn)
    pub angular_velocity: f64,
    /// Empfohlene Animationsdauer
    pub animation_duration_ms: u64,
}

/// Rollierender Heading-Verlauf mit Winkelgeschwindigkeits-Schätzung.
#[derive(Debug, Clone)]
pub struct HeadingSmoother {
    history: VecDeque<(f64, u64)>,
    bearing: Option<f64>,
    min_step_ms: u64,
    high_speed_mps: f64,
}

impl HeadingSmoother {
    /// Erstellt einen Smoother; `min_step_ms` ist das Animations-Tick-Intervall.
    pub fn new(min_step_ms: u64, high_speed_mps: f64) -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_LEN),
            bearing: None,
            min_step_ms: min_step_ms.max(1),
            high_speed_mps: high_speed_mps.max(f64::EPSILON),
        }
    }

    /// Aktuelle geglättete Peilung
    pub fn bearing(&self) -> Option<f64> {
        self.bearing
    }

    /// Verwirft den Verlauf
    pub fn reset(&mut self) {
        self.history.clear();
        self.bearing = None;
    }

    /// Winkelgeschwindigkeit über den gespeicherten Verlauf (°/s).
    pub fn angular_velocity(&self) -> f64 {
        let (Some(&(_, first_ts)), Some(&(_, last_ts))) = (self.history.front(), self.history.back())
        else {
            return 0.0;
        };
        let dt = last_ts.saturating_sub(first_ts) as f64 / 1000.0;
        if dt <= f64::EPSILON {
            return 0.0;
        }
        let turned: f64 = self
            .history
            .iter()
            .zip(self.history.iter().skip(1))
            .map(|(a, b)| heading_diff(a.0, b.0))
            .sum();
        turned / dt
    }

    /// Nimmt ein neues Heading auf und liefert die nächste Kamera-Peilung.
    pub fn push(&mut self, heading: f64, timestamp_ms: u64, speed_mps: f64) -> SmoothedHeading {
        let heading = normalize_angle(heading);
        let step_ms = self
            .history
            .back()
            .map_or(self.min_step_ms, |&(_, ts)| timestamp_ms.saturating_sub(ts))
            .max(self.min_step_ms);

        if self
            .history
            .back()
            .is_some_and(|&(_, ts)| timestamp_ms < ts)
        {
            log::debug!("HeadingSmoother: Zeitstempel rückwärts, Verlauf verworfen");
            self.history.clear();
        }
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back((heading, timestamp_ms));

        let omega = self.angular_velocity();
        let target = if omega.abs() > PREDICTION_MIN_RATE {
            normalize_angle(heading + omega * PREDICTION_SECONDS)
        } else {
            heading
        };

        let current = self.bearing.unwrap_or(target);
        let max_step = MAX_TURN_RATE * step_ms as f64 / 1000.0;
        let delta = heading_diff(current, target).clamp(-max_step, max_step);
        let bearing = normalize_angle(current + delta);
        self.bearing = Some(bearing);

        SmoothedHeading {
            bearing,
            angular_velocity: omega,
            animation_duration_ms: self.duration_for(delta, speed_mps),
        }
    }

    /// Animationsdauer: proportional zur Drehung, umgekehrt proportional zum Tempo.
    pub fn duration_for(&self, delta_deg: f64, speed_mps: f64) -> u64 {
        let speed_factor = (speed_mps.max(0.0) / self.high_speed_mps).clamp(MIN_SPEED_FACTOR, 1.0);
        let raw = (BASE_DURATION_MS + TURN_DURATION_MS * delta_deg.abs() / 180.0) / speed_factor;
        raw.clamp(DURATION_RANGE_MS.0, DURATION_RANGE_MS.1).round() as u64
    }
}
