//! Zeitbasis einer Sitzung.
//!
//! Alle Zeitstempel im Kern (Tracker-Start, Kamera-Animationen, Heartbeat)
//! liegen in der Zeitbasis der Positionsquelle. Zwischen zwei Fixes wird die
//! Zeit monoton über `Instant` fortgeschrieben.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Millisekunden seit Unix-Epoche.
pub fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Uhr in der Zeitbasis der Positionsquelle.
///
/// Vor dem ersten Fix gilt die Wanduhr. Jeder Fix setzt den Anker neu.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    anchor: Option<(u64, Instant)>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Übernimmt den Zeitstempel eines eingetroffenen Fixes.
    pub fn observe(&mut self, fix_ms: u64) {
        self.observe_at(fix_ms, Instant::now());
    }

    /// Aktuelle Zeit in Millisekunden der Sitzungs-Zeitbasis.
    pub fn now_ms(&self) -> u64 {
        self.now_at(Instant::now())
    }

    fn observe_at(&mut self, fix_ms: u64, at: Instant) {
        self.anchor = Some((fix_ms, at));
    }

    fn now_at(&self, at: Instant) -> u64 {
        match self.anchor {
            Some((fix_ms, since)) => {
                fix_ms + at.saturating_duration_since(since).as_millis() as u64
            }
            None => wall_clock_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CameraAnimator, CameraParameters};
    use std::time::Duration;

    #[test]
    fn follows_fix_time_base_between_fixes() {
        let start = Instant::now();
        let mut clock = SessionClock::new();
        // Monotone Quelle: Millisekunden seit Systemstart
        clock.observe_at(5_000, start);

        assert_eq!(clock.now_at(start), 5_000);
        assert_eq!(clock.now_at(start + Duration::from_millis(250)), 5_250);

        clock.observe_at(6_000, start + Duration::from_millis(1_000));
        assert_eq!(clock.now_at(start + Duration::from_millis(1_100)), 6_100);
    }

    #[test]
    fn without_fix_uses_wall_clock() {
        let clock = SessionClock::new();
        let before = wall_clock_ms();
        let now = clock.now_ms();
        assert!(now >= before);
    }

    #[test]
    fn animation_in_fix_time_base_is_smoothed() {
        let start = Instant::now();
        let mut clock = SessionClock::new();
        clock.observe_at(12_000, start);

        let from = CameraParameters {
            zoom: 18.0,
            pitch: 0.0,
            bearing: 0.0,
            animation_duration_ms: 0,
        };
        let to = CameraParameters {
            zoom: 16.0,
            pitch: 30.0,
            bearing: 90.0,
            animation_duration_ms: 1_000,
        };
        let mut animator = CameraAnimator::new(from);
        animator.animate_to(to, 12_000);

        let mid = animator
            .tick(clock.now_at(start + Duration::from_millis(500)))
            .unwrap();
        assert!(mid.zoom < 18.0 && mid.zoom > 16.0);
        assert!(mid.bearing > 0.0 && mid.bearing < 90.0);

        let done = animator
            .tick(clock.now_at(start + Duration::from_millis(1_000)))
            .unwrap();
        assert_eq!(done.zoom, 16.0);
        assert_eq!(done.bearing, 90.0);
    }
}
