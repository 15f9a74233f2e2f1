//! Use-Case-Funktionen für die Kameraführung.

use crate::app::events::NavEffect;
use crate::app::state::SessionState;
use crate::core::{AnimationKind, CameraParameters, ManeuverContext, Position, UpcomingManeuver};

/// Berechnet neue Ziel-Parameter und startet die Animationen dorthin.
pub fn update_target(
    state: &mut SessionState,
    position: &Position,
    upcoming: Option<&UpcomingManeuver>,
    now_ms: u64,
) {
    let context = upcoming.map(|u| ManeuverContext::new(&u.maneuver, u.distance_m));
    let target = state.camera.update(position, context.as_ref());
    state.animator.animate_to(target, now_ms);
    state.streams.publish_camera(target);
}

/// Schreibt laufende Animationen fort und gibt das Zwischenergebnis an die Karte.
pub fn advance_camera(state: &mut SessionState, now_ms: u64) {
    if let Some(params) = state.animator.tick(now_ms) {
        state.effects.push(NavEffect::ApplyCamera(params));
    }
}

/// Übernimmt den Kamerazustand des Renderers als Startwert,
/// solange keine Animation läuft.
pub fn sync_camera(state: &mut SessionState, params: CameraParameters) {
    if state.animator.is_animating(AnimationKind::Bearing)
        || state.animator.is_animating(AnimationKind::ZoomPitch)
    {
        log::debug!("Kamera-Sync während Animation ignoriert");
        return;
    }
    state.animator.set_current(params);
}
