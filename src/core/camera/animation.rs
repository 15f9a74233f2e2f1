//! Kooperative Kamera-Animationen, pro Art höchstens eine aktive.

use super::{ease_in_out_cubic, CameraParameters};
use crate::shared::geo::interpolate_heading;

/// Art einer Kamera-Animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// Drehung der Peilung
    Bearing,
    /// Zoom und Neigung gemeinsam
    ZoomPitch,
}

#[derive(Debug, Clone, Copy)]
struct Animation {
    from: CameraParameters,
    to: CameraParameters,
    start_ms: u64,
    duration_ms: u64,
}

impl Animation {
    fn progress(&self, now_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let t = now_ms.saturating_sub(self.start_ms) as f64 / self.duration_ms as f64;
        ease_in_out_cubic(t.clamp(0.0, 1.0))
    }

    fn is_finished(&self, now_ms: u64) -> bool {
        now_ms >= self.start_ms + self.duration_ms
    }
}

/// Treibt Kamera-Animationen tick-basiert voran.
///
/// Eine neue Animation einer Art ersetzt die laufende derselben Art; die neue
/// startet am aktuell interpolierten Wert.
#[derive(Debug, Clone)]
pub struct CameraAnimator {
    current: CameraParameters,
    bearing: Option<Animation>,
    zoom_pitch: Option<Animation>,
}

impl CameraAnimator {
    /// Erstellt einen Animator mit Startwerten
    pub fn new(current: CameraParameters) -> Self {
        Self {
            current,
            bearing: None,
            zoom_pitch: None,
        }
    }

    /// Aktuelle (interpolierte) Kamera-Parameter
    pub fn current(&self) -> CameraParameters {
        self.current
    }

    /// Übernimmt den Kamerazustand des Renderers, bricht alles ab
    pub fn set_current(&mut self, current: CameraParameters) {
        self.cancel_all();
        self.current = current;
    }

    /// Läuft eine Animation dieser Art?
    pub fn is_animating(&self, kind: AnimationKind) -> bool {
        self.slot(kind).is_some()
    }

    /// Startet eine Animation; eine laufende derselben Art wird abgebrochen.
    pub fn start(&mut self, kind: AnimationKind, target: CameraParameters, now_ms: u64) {
        self.tick(now_ms);
        let animation = Animation {
            from: self.current,
            to: target,
            start_ms: now_ms,
            duration_ms: target.animation_duration_ms,
        };
        if self.slot_mut(kind).replace(animation).is_some() {
            log::debug!("CameraAnimator: laufende {kind:?}-Animation ersetzt");
        }
    }

    /// Startet Animationen für alle Komponenten, die vom Ziel abweichen.
    pub fn animate_to(&mut self, target: CameraParameters, now_ms: u64) {
        let current = self.current;
        if crate::shared::geo::heading_diff(current.bearing, target.bearing).abs() > 0.5 {
            self.start(AnimationKind::Bearing, target, now_ms);
        }
        if (current.zoom - target.zoom).abs() > 0.01 || (current.pitch - target.pitch).abs() > 0.1 {
            self.start(AnimationKind::ZoomPitch, target, now_ms);
        }
    }

    /// Bricht alle Animationen ab, der aktuelle Wert bleibt stehen.
    pub fn cancel_all(&mut self) {
        self.bearing = None;
        self.zoom_pitch = None;
    }

    /// Schreitet alle Animationen fort; `Some` wenn sich etwas geändert hat.
    pub fn tick(&mut self, now_ms: u64) -> Option<CameraParameters> {
        if self.bearing.is_none() && self.zoom_pitch.is_none() {
            return None;
        }

        if let Some(anim) = self.bearing {
            let t = anim.progress(now_ms);
            self.current.bearing = interpolate_heading(anim.from.bearing, anim.to.bearing, t);
            self.current.animation_duration_ms = anim.to.animation_duration_ms;
            if anim.is_finished(now_ms) {
                self.current.bearing = anim.to.bearing;
                self.bearing = None;
            }
        }
        if let Some(anim) = self.zoom_pitch {
            let t = anim.progress(now_ms);
            self.current.zoom = anim.from.zoom + (anim.to.zoom - anim.from.zoom) * t;
            self.current.pitch = anim.from.pitch + (anim.to.pitch - anim.from.pitch) * t;
            if anim.is_finished(now_ms) {
                self.current.zoom = anim.to.zoom;
                self.current.pitch = anim.to.pitch;
                self.zoom_pitch = None;
            }
        }
        Some(self.current)
    }

    fn slot(&self, kind: AnimationKind) -> Option<&Animation> {
        match kind {
            AnimationKind::Bearing => self.bearing.as_ref(),
            AnimationKind::ZoomPitch => self.zoom_pitch.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: AnimationKind) -> &mut Option<Animation> {
        match kind {
            AnimationKind::Bearing => &mut self.bearing,
            AnimationKind::ZoomPitch => &mut self.zoom_pitch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn params(zoom: f64, pitch: f64, bearing: f64, duration: u64) -> CameraParameters {
        CameraParameters {
            zoom,
            pitch,
            bearing,
            animation_duration_ms: duration,
        }
    }

    #[test]
    fn bearing_animation_takes_shortest_path() {
        let mut anim = CameraAnimator::new(params(16.0, 45.0, 350.0, 0));
        anim.start(AnimationKind::Bearing, params(16.0, 45.0, 10.0, 1000), 0);

        let mid = anim.tick(500).unwrap();
        assert_abs_diff_eq!(mid.bearing, 0.0, epsilon = 1e-9);

        let end = anim.tick(1000).unwrap();
        assert_abs_diff_eq!(end.bearing, 10.0, epsilon = 1e-9);
        assert!(!anim.is_animating(AnimationKind::Bearing));
        assert!(anim.tick(1100).is_none());
    }

    #[test]
    fn new_animation_of_same_kind_replaces_running_one() {
        let mut anim = CameraAnimator::new(params(18.0, 30.0, 0.0, 0));
        anim.start(AnimationKind::ZoomPitch, params(15.0, 60.0, 0.0, 1000), 0);
        anim.tick(500);
        let halfway = anim.current();
        assert_abs_diff_eq!(halfway.zoom, 16.5, epsilon = 1e-9);

        anim.start(AnimationKind::ZoomPitch, params(18.0, 30.0, 0.0, 400), 500);
        let end = anim.tick(900).unwrap();
        assert_abs_diff_eq!(end.zoom, 18.0, epsilon = 1e-9);
        assert_abs_diff_eq!(end.pitch, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn kinds_run_independently() {
        let mut anim = CameraAnimator::new(params(18.0, 30.0, 0.0, 0));
        anim.start(AnimationKind::Bearing, params(18.0, 30.0, 90.0, 200), 0);
        anim.start(AnimationKind::ZoomPitch, params(16.0, 50.0, 0.0, 800), 0);
        let p = anim.tick(300).unwrap();
        assert_abs_diff_eq!(p.bearing, 90.0, epsilon = 1e-9);
        assert!(anim.is_animating(AnimationKind::ZoomPitch));
        assert!(p.zoom < 18.0 && p.zoom > 16.0);
    }
}
