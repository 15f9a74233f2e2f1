//! Manöver-Vorschau: geschwindigkeitsabhängige Ansage-Schwellen und
//! Zusammenfassung kurz aufeinanderfolgender Manöver.

use super::route::{RouteModel, Step};
use super::{Maneuver, ManeuverKind};

/// Sekunden bis zum Manöver für die Sofort-Schwelle.
const IMMEDIATE_SECONDS: f64 = 2.0;
/// Sekunden bis zum Manöver für die minimale Ansage-Distanz.
const MIN_ANNOUNCE_SECONDS: f64 = 3.0;
/// Sekunden bis zum Manöver für die maximale Ansage-Distanz.
const MAX_ANNOUNCE_SECONDS: f64 = 15.0;

/// Grenzen der Sofort-Schwelle in Metern.
const IMMEDIATE_RANGE_M: (f64, f64) = (20.0, 100.0);
/// Grenzen der minimalen Ansage-Distanz in Metern.
const MIN_ANNOUNCE_RANGE_M: (f64, f64) = (50.0, 200.0);
/// Grenzen der maximalen Ansage-Distanz in Metern.
const MAX_ANNOUNCE_RANGE_M: (f64, f64) = (200.0, 800.0);

/// Standard-Grenze für komplexe Sequenzen.
const SEQUENCE_LIMIT_DEFAULT_M: f64 = 100.0;
/// Rampe → Abbiegen.
const SEQUENCE_LIMIT_RAMP_TURN_M: f64 = 150.0;
/// Kreisverkehr → Abbiegen.
const SEQUENCE_LIMIT_ROUNDABOUT_TURN_M: f64 = 200.0;
/// Gabelung → Einfädeln.
const SEQUENCE_LIMIT_FORK_MERGE_M: f64 = 150.0;

/// Dringlichkeit einer Ansage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnnouncementUrgency {
    /// Vorankündigung (innerhalb der maximalen Ansage-Distanz)
    Advance,
    /// Vorbereitung (innerhalb der minimalen Ansage-Distanz)
    Prepare,
    /// Unmittelbar bevorstehend
    Immediate,
}

/// Ansage-Schwellen in Metern
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnounceThresholds {
    /// Sofort-Schwelle
    pub immediate_m: f64,
    /// Minimale Ansage-Distanz
    pub min_announce_m: f64,
    /// Maximale Ansage-Distanz
    pub max_announce_m: f64,
}

impl AnnounceThresholds {
    /// Schwellen für eine Geschwindigkeit (m/s), ohne Komplexitätszuschlag.
    pub fn for_speed(speed_mps: f64) -> Self {
        let speed = if speed_mps.is_finite() {
            speed_mps.max(0.0)
        } else {
            0.0
        };
        Self {
            immediate_m: (speed * IMMEDIATE_SECONDS).clamp(IMMEDIATE_RANGE_M.0, IMMEDIATE_RANGE_M.1),
            min_announce_m: (speed * MIN_ANNOUNCE_SECONDS)
                .clamp(MIN_ANNOUNCE_RANGE_M.0, MIN_ANNOUNCE_RANGE_M.1),
            max_announce_m: (speed * MAX_ANNOUNCE_SECONDS)
                .clamp(MAX_ANNOUNCE_RANGE_M.0, MAX_ANNOUNCE_RANGE_M.1),
        }
    }

    /// Schwellen für ein konkretes Manöver (komplexe Manöver ×1,3–1,5).
    pub fn for_maneuver(speed_mps: f64, maneuver: &Maneuver) -> Self {
        let base = Self::for_speed(speed_mps);
        let factor = maneuver.complexity_multiplier();
        Self {
            immediate_m: base.immediate_m * factor,
            min_announce_m: base.min_announce_m * factor,
            max_announce_m: base.max_announce_m * factor,
        }
    }

    /// Dringlichkeit bei gegebener Distanz; `None` außerhalb des Ansage-Fensters.
    pub fn urgency(&self, distance_m: f64) -> Option<AnnouncementUrgency> {
        if distance_m <= self.immediate_m {
            Some(AnnouncementUrgency::Immediate)
        } else if distance_m <= self.min_announce_m {
            Some(AnnouncementUrgency::Prepare)
        } else if distance_m <= self.max_announce_m {
            Some(AnnouncementUrgency::Advance)
        } else {
            None
        }
    }
}

/// Kombinierte Restdistanz, unter der zwei Manöver als eine Einheit gelten.
///
/// `None` an Leg-Grenzen: die Ankunft am Zwischenziel wird nie von der
/// Abfahrt des nächsten Legs verdeckt.
pub fn sequence_limit(first: &Maneuver, second: &Maneuver) -> Option<f64> {
    if first.is_arrival() || second.kind == ManeuverKind::Depart {
        return None;
    }
    let limit = if first.is_ramp() && second.is_turn() {
        SEQUENCE_LIMIT_RAMP_TURN_M
    } else if first.is_roundabout() && (second.is_turn() || second.is_roundabout()) {
        SEQUENCE_LIMIT_ROUNDABOUT_TURN_M
    } else if first.kind == ManeuverKind::Fork && second.kind == ManeuverKind::Merge {
        SEQUENCE_LIMIT_FORK_MERGE_M
    } else {
        SEQUENCE_LIMIT_DEFAULT_M
    };
    Some(limit)
}

/// Ergebnis der Vorschau.
#[derive(Debug, Clone, Copy)]
pub struct LookAhead<'a> {
    /// Anzusagender Step (das Manöver steht an seinem Beginn)
    pub step: &'a Step,
    /// Fortlaufender Index des Steps
    pub flat_index: usize,
    /// Distanz bis zum Manöver
    pub distance_to_maneuver: f64,
    /// Schwellen für dieses Manöver
    pub thresholds: AnnounceThresholds,
    /// `true` wenn das übernächste Manöver vorgezogen wurde
    pub complex_sequence: bool,
}

/// Ermittelt das nächste anzusagende Manöver.
///
/// `current_flat` ist der Step, in dem sich der Fahrer befindet; angesagt
/// wird das Manöver am Beginn des Folge-Steps. Liegen das Folge-Manöver und
/// das übernächste zusammen unter der Sequenz-Grenze, wird direkt das
/// übernächste gemeldet, damit dessen Ansage-Fenster nicht verpasst wird.
pub fn look_ahead(
    route: &RouteModel,
    current_flat: usize,
    distance_traveled: f64,
    speed_mps: f64,
) -> Option<LookAhead<'_>> {
    let upcoming_flat = current_flat + 1;
    let upcoming = route.step_at(upcoming_flat)?;
    let distance = (route.step_route_offset(upcoming_flat)? - distance_traveled).max(0.0);

    if let Some(following) = route.step_at(upcoming_flat + 1) {
        let combined = distance + upcoming.distance;
        let limit = sequence_limit(&upcoming.maneuver, &following.maneuver);
        if limit.is_some_and(|limit| combined < limit) {
            return Some(LookAhead {
                step: following,
                flat_index: upcoming_flat + 1,
                distance_to_maneuver: combined,
                thresholds: AnnounceThresholds::for_maneuver(speed_mps, &following.maneuver),
                complex_sequence: true,
            });
        }
    }

    Some(LookAhead {
        step: upcoming,
        flat_index: upcoming_flat,
        distance_to_maneuver: distance,
        thresholds: AnnounceThresholds::for_maneuver(speed_mps, &upcoming.maneuver),
        complex_sequence: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Leg, ManeuverModifier};
    use crate::shared::geo::{destination_point, Coordinate};
    use approx::assert_abs_diff_eq;

    fn maneuver(kind: ManeuverKind, modifier: Option<ManeuverModifier>) -> Maneuver {
        Maneuver {
            modifier,
            ..Maneuver::new(kind, Coordinate::new(0.0, 0.0))
        }
    }

    #[test]
    fn thresholds_scale_with_speed_and_clamp() {
        let slow = AnnounceThresholds::for_speed(0.0);
        assert_eq!(slow.immediate_m, 20.0);
        assert_eq!(slow.min_announce_m, 50.0);
        assert_eq!(slow.max_announce_m, 200.0);

        let city = AnnounceThresholds::for_speed(20.0);
        assert_eq!(city.immediate_m, 40.0);
        assert_eq!(city.min_announce_m, 60.0);
        assert_eq!(city.max_announce_m, 300.0);

        let highway = AnnounceThresholds::for_speed(80.0);
        assert_eq!(highway.immediate_m, 100.0);
        assert_eq!(highway.min_announce_m, 200.0);
        assert_eq!(highway.max_announce_m, 800.0);

        let broken = AnnounceThresholds::for_speed(f64::NAN);
        assert_eq!(broken, slow);
    }

    #[test]
    fn complex_maneuvers_widen_thresholds() {
        let roundabout = maneuver(ManeuverKind::Roundabout, None);
        let t = AnnounceThresholds::for_maneuver(20.0, &roundabout);
        assert_abs_diff_eq!(t.max_announce_m, 450.0, epsilon = 1e-9);

        let fork = maneuver(ManeuverKind::Fork, Some(ManeuverModifier::SlightLeft));
        let t = AnnounceThresholds::for_maneuver(20.0, &fork);
        assert_abs_diff_eq!(t.max_announce_m, 390.0, epsilon = 1e-9);
    }

    #[test]
    fn urgency_bands() {
        let t = AnnounceThresholds::for_speed(20.0);
        assert_eq!(t.urgency(30.0), Some(AnnouncementUrgency::Immediate));
        assert_eq!(t.urgency(55.0), Some(AnnouncementUrgency::Prepare));
        assert_eq!(t.urgency(250.0), Some(AnnouncementUrgency::Advance));
        assert_eq!(t.urgency(301.0), None);
    }

    #[test]
    fn sequence_limits_by_pairing() {
        let right = Some(ManeuverModifier::Right);
        let turn = maneuver(ManeuverKind::Turn, right);
        assert_eq!(sequence_limit(&maneuver(ManeuverKind::OffRamp, right), &turn), Some(150.0));
        assert_eq!(
            sequence_limit(&maneuver(ManeuverKind::Roundabout, None), &turn),
            Some(200.0)
        );
        assert_eq!(
            sequence_limit(
                &maneuver(ManeuverKind::Fork, None),
                &maneuver(ManeuverKind::Merge, None)
            ),
            Some(150.0)
        );
        assert_eq!(sequence_limit(&turn, &turn), Some(100.0));
        assert_eq!(
            sequence_limit(
                &maneuver(ManeuverKind::Arrive, None),
                &maneuver(ManeuverKind::Depart, None)
            ),
            None
        );
    }

    fn straight_steps(gaps: &[f64]) -> RouteModel {
        let mut p = Coordinate::new(40.0, -3.7);
        let mut steps = Vec::new();
        for (i, gap) in gaps.iter().enumerate() {
            let next = destination_point(p, 90.0, *gap);
            let kind = if i == 0 {
                ManeuverKind::Depart
            } else {
                ManeuverKind::Turn
            };
            steps.push(crate::core::Step {
                maneuver: Maneuver::new(kind, p).with_modifier(ManeuverModifier::Left),
                distance: *gap,
                duration: gap / 10.0,
                geometry: vec![p, next],
                name: None,
            });
            p = next;
        }
        steps.push(crate::core::Step {
            maneuver: Maneuver::new(ManeuverKind::Arrive, p),
            distance: 0.0,
            duration: 0.0,
            geometry: vec![p],
            name: None,
        });
        RouteModel::new(vec![Leg {
            steps,
            summary: None,
        }])
        .unwrap()
    }

    #[test]
    fn far_from_first_maneuver_reports_first() {
        let route = straight_steps(&[500.0, 80.0, 400.0]);
        let ahead = look_ahead(&route, 0, 100.0, 10.0).unwrap();
        assert_eq!(ahead.flat_index, 1);
        assert!(!ahead.complex_sequence);
        assert_abs_diff_eq!(ahead.distance_to_maneuver, 400.0, epsilon = 0.01);
    }

    #[test]
    fn close_pair_reports_second_maneuver_early() {
        let route = straight_steps(&[500.0, 80.0, 400.0]);
        let ahead = look_ahead(&route, 0, 485.0, 10.0).unwrap();
        assert_eq!(ahead.flat_index, 2);
        assert!(ahead.complex_sequence);
        assert_abs_diff_eq!(ahead.distance_to_maneuver, 95.0, epsilon = 0.01);
    }

    #[test]
    fn last_step_has_no_lookahead() {
        let route = straight_steps(&[100.0]);
        assert!(look_ahead(&route, 1, 100.0, 10.0).is_none());
        let ahead = look_ahead(&route, 0, 20.0, 10.0).unwrap();
        assert_eq!(ahead.step.maneuver.kind, ManeuverKind::Arrive);
    }

    #[test]
    fn waypoint_arrival_is_not_folded_into_next_departure() {
        let a = Coordinate::new(40.0, -3.7);
        let b = destination_point(a, 90.0, 1_000.0);
        let c = destination_point(b, 90.0, 1_000.0);
        let leg = |from: Coordinate, to: Coordinate| Leg {
            steps: vec![
                crate::core::Step {
                    maneuver: Maneuver::new(ManeuverKind::Depart, from),
                    distance: 1_000.0,
                    duration: 100.0,
                    geometry: vec![from, to],
                    name: Some("B St".into()),
                },
                crate::core::Step {
                    maneuver: Maneuver::new(ManeuverKind::Arrive, to),
                    distance: 0.0,
                    duration: 0.0,
                    geometry: vec![to],
                    name: None,
                },
            ],
            summary: None,
        };
        let route = RouteModel::new(vec![leg(a, b), leg(b, c)]).unwrap();

        let ahead = look_ahead(&route, 0, 950.0, 10.0).unwrap();
        assert_eq!(ahead.step.maneuver.kind, ManeuverKind::Arrive);
        assert_eq!(ahead.flat_index, 1);
        assert!(!ahead.complex_sequence);
        assert_abs_diff_eq!(ahead.distance_to_maneuver, 50.0, epsilon = 0.01);
    }
}
