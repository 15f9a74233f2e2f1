//! Verträge zu Sprachausgabe und Kartendarstellung.

use std::sync::Arc;

use serde::Serialize;

use super::events::NavEffect;
use crate::core::{CameraParameters, RouteModel};
use crate::shared::geo::Coordinate;

/// Art eines Karten-Markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Start
    Origin,
    /// Zwischenziel
    Waypoint,
    /// Ziel
    Destination,
}

/// Marker auf der Karte
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    /// Art
    pub kind: MarkerKind,
    /// Ort
    pub coordinate: Coordinate,
    /// Index des Legs, das hier endet (Start: 0)
    pub leg_index: usize,
}

/// Start-, Zwischenziel- und Ziel-Marker einer Route.
pub fn markers_for(route: &RouteModel) -> Vec<MapMarker> {
    let mut markers = vec![MapMarker {
        kind: MarkerKind::Origin,
        coordinate: route.origin(),
        leg_index: 0,
    }];
    let waypoints = route.waypoints();
    let last = waypoints.len().saturating_sub(1);
    for (i, coordinate) in waypoints.into_iter().enumerate() {
        markers.push(MapMarker {
            kind: if i == last {
                MarkerKind::Destination
            } else {
                MarkerKind::Waypoint
            },
            coordinate,
            leg_index: i,
        });
    }
    markers
}

/// Sprachausgabe. Erhält nur "jetzt ansagen"-Aufträge.
pub trait VoiceAnnouncer: Send {
    /// Text ansagen
    fn announce(&mut self, text: &str);
    /// Ansagen ein-/ausschalten
    fn set_enabled(&mut self, enabled: bool);
    /// Sind Ansagen aktiv?
    fn is_enabled(&self) -> bool;
}

/// Kartendarstellung
pub trait MapRenderer: Send {
    /// Route anzeigen
    fn set_route(&mut self, polyline: &[Coordinate]);
    /// Route entfernen
    fn clear_route(&mut self);
    /// Gefahrene und verbleibende Strecke
    fn set_progress_split(&mut self, traveled: &[Coordinate], remaining: &[Coordinate]);
    /// Marker setzen
    fn set_markers(&mut self, markers: &[MapMarker]);
    /// Kamera-Parameter übernehmen
    fn apply_camera(&mut self, params: &CameraParameters);
    /// Aktueller Kamerazustand als Startpunkt für Animationen
    fn current_camera(&self) -> Option<CameraParameters> {
        None
    }
}

/// Gebündelte Kollaborateure der Sitzung.
pub struct Collaborators {
    /// Sprachausgabe
    pub voice: Box<dyn VoiceAnnouncer>,
    /// Karte
    pub map: Box<dyn MapRenderer>,
}

impl Collaborators {
    /// Bündelt Sprachausgabe und Karte
    pub fn new(voice: Box<dyn VoiceAnnouncer>, map: Box<dyn MapRenderer>) -> Self {
        Self { voice, map }
    }

    /// Führt einen Effekt aus, sofern er Sprache oder Karte betrifft.
    ///
    /// Gibt `false` zurück für Effekte, die der Aufrufer selbst behandeln muss.
    pub fn dispatch(&mut self, effect: &NavEffect) -> bool {
        match effect {
            NavEffect::Announce { text } => {
                if self.voice.is_enabled() {
                    self.voice.announce(text);
                }
            }
            NavEffect::SetVoiceEnabled { enabled } => self.voice.set_enabled(*enabled),
            NavEffect::ShowRoute { route } => show_route(self.map.as_mut(), route),
            NavEffect::ClearRoute => {
                self.map.clear_route();
                self.map.set_markers(&[]);
            }
            NavEffect::UpdateProgressSplit {
                traveled,
                remaining,
            } => self.map.set_progress_split(traveled, remaining),
            NavEffect::ApplyCamera(params) => self.map.apply_camera(params),
            NavEffect::RequestRoute { .. }
            | NavEffect::RequestReroute { .. }
            | NavEffect::CancelRouting => return false,
        }
        true
    }
}

fn show_route(map: &mut dyn MapRenderer, route: &Arc<RouteModel>) {
    map.set_route(&route.polyline());
    map.set_markers(&markers_for(route));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Leg, Maneuver, ManeuverKind, Step};
    use crate::shared::geo::destination_point;

    fn leg(from: Coordinate, to: Coordinate) -> Leg {
        let d = crate::shared::geo::haversine_distance(from, to);
        Leg {
            steps: vec![
                Step {
                    maneuver: Maneuver::new(ManeuverKind::Depart, from),
                    distance: d,
                    duration: d / 10.0,
                    geometry: vec![from, to],
                    name: None,
                },
                Step {
                    maneuver: Maneuver::new(ManeuverKind::Arrive, to),
                    distance: 0.0,
                    duration: 0.0,
                    geometry: vec![to],
                    name: None,
                },
            ],
            summary: None,
        }
    }

    #[test]
    fn markers_for_two_legs() {
        let a = Coordinate::new(37.7749, -122.4194);
        let b = destination_point(a, 45.0, 1_000.0);
        let c = destination_point(b, 90.0, 1_000.0);
        let route = RouteModel::new(vec![leg(a, b), leg(b, c)]).unwrap();
        let markers = markers_for(&route);
        let kinds: Vec<_> = markers.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![MarkerKind::Origin, MarkerKind::Waypoint, MarkerKind::Destination]
        );
        assert_eq!(markers[2].coordinate, c);
    }
}
