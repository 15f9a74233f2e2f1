//! Geschwindigkeitsadaptive Kameraführung: Zoom, Neigung und Peilung.

pub mod animation;
pub mod heading;

use serde::{Deserialize, Serialize};

use super::{Maneuver, Position};
use crate::shared::options::CameraOptions;
pub use animation::{AnimationKind, CameraAnimator};
pub use heading::{HeadingSmoother, SmoothedHeading};

/// Zoom-Reduktion bei schneller Drehung.
const TURN_ZOOM_STEP: f64 = 1.0;
/// Ab dieser Winkelgeschwindigkeit (°/s) wird herausgezoomt.
const TURN_ZOOM_RATE: f64 = 30.0;
/// Neigungs-Reduktion bei sehr schneller Drehung.
const TURN_PITCH_STEP: f64 = 10.0;
/// Ab dieser Winkelgeschwindigkeit (°/s) wird die Neigung reduziert.
const TURN_PITCH_RATE: f64 = 45.0;
/// Unter dieser Winkelgeschwindigkeit gilt die Fahrt als geradeaus.
const STRAIGHT_RATE: f64 = 5.0;
/// Zusätzliche Neigung bei schneller Geradeausfahrt.
const STRAIGHT_PITCH_BOOST: f64 = 5.0;

/// Zoom-Änderung bei Annäherung an komplexe Manöver.
const COMPLEX_ZOOM_OUT: f64 = 0.75;
/// Neigungs-Änderung bei Annäherung an komplexe Manöver.
const COMPLEX_PITCH_DROP: f64 = 8.0;
/// Zuschlag für Kreisverkehre.
const ROUNDABOUT_EXTRA_ZOOM_OUT: f64 = 0.5;
/// Zuschlag für Kreisverkehre.
const ROUNDABOUT_EXTRA_PITCH_DROP: f64 = 5.0;
/// Zoom-Änderung bei Auf-/Abfahrten und Einfädeln.
const RAMP_ZOOM_OUT: f64 = 1.0;
/// Neigungs-Änderung bei Auf-/Abfahrten und Einfädeln.
const RAMP_PITCH_DROP: f64 = 10.0;
/// Zoom-Änderung bei einfachen Manövern.
const SIMPLE_ZOOM_IN: f64 = 0.5;
/// Dauer für Zoom/Neigungs-Animationen.
const ZOOM_PITCH_DURATION_MS: u64 = 600;

/// Kubisches Ease-in-out auf [0, 1].
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Ziel-Parameter der Kamera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraParameters {
    /// Zoom-Stufe
    pub zoom: f64,
    /// Neigung in Grad
    pub pitch: f64,
    /// Peilung in Grad [0, 360)
    pub bearing: f64,
    /// Dauer der Übergangsanimation
    pub animation_duration_ms: u64,
}

/// Nächstes Manöver aus Sicht der Kamera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManeuverContext {
    /// Distanz zum Manöver
    pub distance_m: f64,
    /// Komplexes Manöver
    pub complex: bool,
    /// Kreisverkehr
    pub roundabout: bool,
    /// Auf-/Abfahrt oder Einfädeln
    pub ramp_or_merge: bool,
}

impl ManeuverContext {
    /// Leitet den Kontext aus einem Manöver ab
    pub fn new(maneuver: &Maneuver, distance_m: f64) -> Self {
        Self {
            distance_m,
            complex: maneuver.is_complex(),
            roundabout: maneuver.is_roundabout(),
            ramp_or_merge: maneuver.is_ramp_or_merge(),
        }
    }
}

/// Berechnet Ziel-Kameraparameter aus Position, Drehung und Manöver-Nähe.
#[derive(Debug, Clone)]
pub struct CameraDynamics {
    options: CameraOptions,
    smoother: HeadingSmoother,
    last: Option<CameraParameters>,
}

impl CameraDynamics {
    /// Erstellt die Kamera-Dynamik mit den gegebenen Grenzen
    pub fn new(options: CameraOptions) -> Self {
        Self {
            smoother: HeadingSmoother::new(options.tick_interval_ms, options.high_speed_mps),
            options,
            last: None,
        }
    }

    /// Zuletzt berechnete Parameter
    pub fn last(&self) -> Option<CameraParameters> {
        self.last
    }

    /// Setzt Verlauf und letzte Parameter zurück
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.last = None;
    }

    /// Grundkurve: (Zoom, Neigung) abhängig von der Geschwindigkeit.
    pub fn base_curve(&self, speed_mps: f64) -> (f64, f64) {
        let o = &self.options;
        let span = (o.high_speed_mps - o.low_speed_mps).max(f64::EPSILON);
        let ratio = ((speed_mps.max(0.0) - o.low_speed_mps) / span).clamp(0.0, 1.0);
        let eased = ease_in_out_cubic(ratio);
        (
            o.zoom_max - (o.zoom_max - o.zoom_min) * eased,
            o.pitch_min + (o.pitch_max - o.pitch_min) * eased,
        )
    }

    /// Anpassung für Kurvenfahrt.
    pub fn turn_adjustment(
        &self,
        zoom: f64,
        pitch: f64,
        angular_velocity: f64,
        speed_mps: f64,
    ) -> (f64, f64) {
        let o = &self.options;
        let rate = angular_velocity.abs();
        let mut zoom = zoom;
        let mut pitch = pitch;
        if rate > TURN_ZOOM_RATE {
            zoom -= TURN_ZOOM_STEP;
        }
        if rate > TURN_PITCH_RATE {
            pitch -= TURN_PITCH_STEP;
        }
        let high_speed = speed_mps > (o.low_speed_mps + o.high_speed_mps) / 2.0;
        if rate < STRAIGHT_RATE && high_speed {
            pitch = (pitch + STRAIGHT_PITCH_BOOST).min(o.pitch_max);
        }
        (zoom, pitch)
    }

    /// Anpassung bei Annäherung an ein Manöver innerhalb des Radius.
    pub fn maneuver_adjustment(
        &self,
        zoom: f64,
        pitch: f64,
        maneuver: &ManeuverContext,
    ) -> (f64, f64) {
        let radius = self.options.maneuver_radius_m.max(f64::EPSILON);
        if maneuver.distance_m > radius {
            return (zoom, pitch);
        }
        let factor = 1.0 - (maneuver.distance_m / radius).clamp(0.0, 1.0);

        if maneuver.ramp_or_merge {
            return (zoom - RAMP_ZOOM_OUT * factor, pitch - RAMP_PITCH_DROP * factor);
        }
        if maneuver.complex {
            let mut zoom_out = COMPLEX_ZOOM_OUT;
            let mut pitch_drop = COMPLEX_PITCH_DROP;
            if maneuver.roundabout {
                zoom_out += ROUNDABOUT_EXTRA_ZOOM_OUT;
                pitch_drop += ROUNDABOUT_EXTRA_PITCH_DROP;
            }
            return (zoom - zoom_out * factor, pitch - pitch_drop * factor);
        }
        (zoom + SIMPLE_ZOOM_IN * factor, pitch)
    }

    /// Berechnet die Ziel-Parameter für eine neue Position.
    ///
    /// Ohne Heading bleibt die letzte Peilung erhalten.
    pub fn update(
        &mut self,
        position: &Position,
        maneuver: Option<&ManeuverContext>,
    ) -> CameraParameters {
        let speed = position.speed.unwrap_or(0.0);
        let (bearing, angular_velocity, bearing_duration) = match position.heading {
            Some(heading) => {
                let smoothed = self.smoother.push(heading, position.timestamp_ms, speed);
                (
                    smoothed.bearing,
                    smoothed.angular_velocity,
                    smoothed.animation_duration_ms,
                )
            }
            None => (
                self.smoother
                    .bearing()
                    .or(self.last.map(|l| l.bearing))
                    .unwrap_or(0.0),
                0.0,
                ZOOM_PITCH_DURATION_MS,
            ),
        };

        let (zoom, pitch) = self.base_curve(speed);
        let (zoom, pitch) = self.turn_adjustment(zoom, pitch, angular_velocity, speed);
        let (zoom, pitch) = match maneuver {
            Some(m) => self.maneuver_adjustment(zoom, pitch, m),
            None => (zoom, pitch),
        };

        let o = &self.options;
        let params = CameraParameters {
            zoom: zoom.clamp(o.zoom_min, o.zoom_max),
            pitch: pitch.clamp(o.pitch_min, o.pitch_max),
            bearing,
            animation_duration_ms: bearing_duration.max(ZOOM_PITCH_DURATION_MS),
        };
        self.last = Some(params);
        params
    }
}
