//! Routenfortschritt als reine Funktion von Route, Position und Laufzeit.

use serde::Serialize;

use super::lookahead::{self, AnnounceThresholds};
use super::route::RouteModel;
use super::{Maneuver, Position};
use crate::shared::geo::{self, Coordinate};

/// Nächstes anzusagendes Manöver mit Distanz und Schwellen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingManeuver {
    /// Das Manöver selbst
    pub maneuver: Maneuver,
    /// Fortlaufender Step-Index des Manövers
    pub flat_step_index: usize,
    /// Straßenname nach dem Manöver
    pub street_name: Option<String>,
    /// Distanz bis zum Manöver in Metern
    pub distance_m: f64,
    /// Zusammengefasste Sequenz (übernächstes Manöver vorgezogen)
    pub complex_sequence: bool,
    /// Geschwindigkeitsabhängige Ansage-Schwellen
    #[serde(skip)]
    pub thresholds: AnnounceThresholds,
}

/// Fortschritt entlang der aktiven Route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteProgress {
    /// Gemeldete Position
    pub location: Coordinate,
    /// Auf die Route projizierter Punkt
    pub snapped_location: Coordinate,
    /// Zurückgelegte Distanz entlang der Route
    pub distance_traveled: f64,
    /// Restdistanz der Route
    pub distance_remaining: f64,
    /// Restdauer der Route in Sekunden
    pub duration_remaining: f64,
    /// Restdistanz im aktuellen Leg
    pub leg_distance_remaining: f64,
    /// Restdauer im aktuellen Leg in Sekunden
    pub leg_duration_remaining: f64,
    /// Index des aktuellen Legs
    pub leg_index: usize,
    /// Index des aktuellen Steps im Leg
    pub step_index: usize,
    /// Fortlaufender Step-Index über alle Legs
    pub flat_step_index: usize,
    /// Position liegt innerhalb der Toleranz auf der Route
    pub on_route: bool,
    /// Abstand zur Routengeometrie
    pub distance_from_route: f64,
    /// Nächstes Manöver (fehlt am letzten Step)
    pub upcoming: Option<UpcomingManeuver>,
    /// Direkte Distanz zum Ziel
    pub distance_to_destination: f64,
    /// Anteil der zurückgelegten Strecke in [0, 1]
    pub fraction_traveled: f64,
    /// Laufzeit seit Start der Verfolgung
    pub elapsed_ms: u64,
}

impl RouteProgress {
    /// Berechnet den Fortschritt; `None` bei nicht projizierbarer Position.
    pub fn compute(
        route: &RouteModel,
        position: &Position,
        elapsed_ms: u64,
        on_route_tolerance_m: f64,
        speed_mps: f64,
    ) -> Option<Self> {
        let location = position.coordinate();
        if !location.is_valid() {
            return None;
        }
        let snap = route.snap(location)?;

        let total = route.total_distance();
        let traveled = snap.distance_along_route.clamp(0.0, total);
        let leg_end = route.leg_offset(snap.leg_index)?
            + route.legs().get(snap.leg_index).map_or(0.0, |leg| leg.distance());
        let (duration_remaining, leg_duration_remaining) = route.remaining_durations(&snap);

        let upcoming = lookahead::look_ahead(route, snap.flat_step_index, traveled, speed_mps).map(
            |ahead| UpcomingManeuver {
                maneuver: ahead.step.maneuver.clone(),
                flat_step_index: ahead.flat_index,
                street_name: ahead.step.name.clone(),
                distance_m: ahead.distance_to_maneuver,
                complex_sequence: ahead.complex_sequence,
                thresholds: ahead.thresholds,
            },
        );

        let fraction_traveled = if total > f64::EPSILON {
            (traveled / total).clamp(0.0, 1.0)
        } else {
            1.0
        };

        Some(Self {
            location,
            snapped_location: snap.point,
            distance_traveled: traveled,
            distance_remaining: (total - traveled).max(0.0),
            duration_remaining,
            leg_distance_remaining: (leg_end - traveled).max(0.0),
            leg_duration_remaining,
            leg_index: snap.leg_index,
            step_index: snap.step_index,
            flat_step_index: snap.flat_step_index,
            on_route: snap.distance_from_route <= on_route_tolerance_m,
            distance_from_route: snap.distance_from_route,
            upcoming,
            distance_to_destination: geo::haversine_distance(location, route.destination()),
            fraction_traveled,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Leg, ManeuverKind, ManeuverModifier, Step};
    use crate::shared::geo::{destination_point, point_along};
    use approx::assert_abs_diff_eq;

    fn two_leg_route() -> RouteModel {
        let a = Coordinate::new(52.52, 13.40);
        let b = destination_point(a, 90.0, 400.0);
        let c = destination_point(b, 0.0, 600.0);
        let step = |kind, from: Coordinate, to: Coordinate, d: f64| Step {
            maneuver: Maneuver::new(kind, from).with_modifier(ManeuverModifier::Left),
            distance: d,
            duration: d / 10.0,
            geometry: vec![from, to],
            name: Some("Hauptstraße".into()),
        };
        let arrive = |at: Coordinate| Step {
            maneuver: Maneuver::new(ManeuverKind::Arrive, at),
            distance: 0.0,
            duration: 0.0,
            geometry: vec![at],
            name: None,
        };
        RouteModel::new(vec![
            Leg {
                steps: vec![step(ManeuverKind::Depart, a, b, 400.0), arrive(b)],
                summary: None,
            },
            Leg {
                steps: vec![step(ManeuverKind::Depart, b, c, 600.0), arrive(c)],
                summary: None,
            },
        ])
        .unwrap()
    }

    #[test]
    fn progress_in_second_leg() {
        let route = two_leg_route();
        let at = point_along(&route.polyline(), 700.0).unwrap();
        let p = Position::at(at, 1_000);
        let progress = RouteProgress::compute(&route, &p, 5_000, 15.0, 10.0).unwrap();

        assert_eq!(progress.leg_index, 1);
        assert!(progress.on_route);
        assert_abs_diff_eq!(progress.distance_traveled, 700.0, epsilon = 0.5);
        assert_abs_diff_eq!(progress.distance_remaining, 300.0, epsilon = 0.5);
        assert_abs_diff_eq!(progress.leg_distance_remaining, 300.0, epsilon = 0.5);
        assert_abs_diff_eq!(progress.duration_remaining, 30.0, epsilon = 0.1);
        assert_abs_diff_eq!(progress.fraction_traveled, 0.7, epsilon = 1e-3);
        assert_eq!(progress.elapsed_ms, 5_000);

        let upcoming = progress.upcoming.unwrap();
        assert_eq!(upcoming.maneuver.kind, ManeuverKind::Arrive);
        assert_abs_diff_eq!(upcoming.distance_m, 300.0, epsilon = 0.5);
    }

    #[test]
    fn off_route_position_is_flagged() {
        let route = two_leg_route();
        let at = point_along(&route.polyline(), 200.0).unwrap();
        let p = Position::at(destination_point(at, 0.0, 40.0), 0);
        let progress = RouteProgress::compute(&route, &p, 0, 15.0, 0.0).unwrap();
        assert!(!progress.on_route);
        assert_abs_diff_eq!(progress.distance_from_route, 40.0, epsilon = 0.5);
    }

    #[test]
    fn invalid_position_yields_none() {
        let route = two_leg_route();
        let p = Position::new(f64::NAN, 13.4, 0);
        assert!(RouteProgress::compute(&route, &p, 0, 15.0, 0.0).is_none());
    }
}
