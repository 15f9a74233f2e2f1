#![allow(dead_code)]

use turn_guidance::shared::geo::{
    destination_point, haversine_distance, initial_bearing, point_along, polyline_length,
};
use turn_guidance::{
    Coordinate, Leg, Maneuver, ManeuverKind, ManeuverModifier, Position, RouteModel, Step,
};

pub const SF: Coordinate = Coordinate::new(37.7749, -122.4194);
pub const OAKLAND: Coordinate = Coordinate::new(37.8044, -122.2712);
/// Zwischenziel am Ferry Building
pub const FERRY_BUILDING: Coordinate = Coordinate::new(37.7955, -122.3937);

pub fn step(
    kind: ManeuverKind,
    modifier: Option<ManeuverModifier>,
    geometry: Vec<Coordinate>,
    name: &str,
) -> Step {
    let distance = polyline_length(&geometry);
    Step {
        maneuver: Maneuver {
            modifier,
            ..Maneuver::new(kind, geometry[0])
        },
        distance,
        duration: distance / 13.0,
        geometry,
        name: Some(name.to_string()),
    }
}

pub fn arrive(at: Coordinate) -> Step {
    Step {
        maneuver: Maneuver::new(ManeuverKind::Arrive, at),
        distance: 0.0,
        duration: 0.0,
        geometry: vec![at],
        name: None,
    }
}

/// Leg mit Abfahrt, einer Rechtskurve am Knick und Ankunft.
pub fn leg_via(from: Coordinate, via: Coordinate, to: Coordinate, street: &str) -> Leg {
    Leg {
        steps: vec![
            step(ManeuverKind::Depart, None, vec![from, via], "Market Street"),
            step(
                ManeuverKind::Turn,
                Some(ManeuverModifier::Right),
                vec![via, to],
                street,
            ),
            arrive(to),
        ],
        summary: None,
    }
}

/// Knick im ersten Leg
pub const VIA_SOMA: Coordinate = Coordinate::new(37.7850, -122.4060);
/// Knick im zweiten Leg
pub const VIA_BAY_BRIDGE: Coordinate = Coordinate::new(37.8000, -122.3300);

/// SF → Ferry Building → Oakland, zwei Legs.
pub fn sf_oakland_route() -> RouteModel {
    RouteModel::new(vec![
        leg_via(SF, VIA_SOMA, FERRY_BUILDING, "The Embarcadero"),
        leg_via(FERRY_BUILDING, VIA_BAY_BRIDGE, OAKLAND, "Bay Bridge"),
    ])
    .unwrap()
}

/// Gerade Strecke nach Osten mit Abfahrt und Ankunft.
pub fn straight_route(length_m: f64) -> RouteModel {
    let end = destination_point(SF, 90.0, length_m);
    RouteModel::new(vec![Leg {
        steps: vec![
            step(ManeuverKind::Depart, None, vec![SF, end], "Market Street"),
            arrive(end),
        ],
        summary: None,
    }])
    .unwrap()
}

/// Positionen entlang der Polyline im Abstand `spacing_m`, ein Fix pro Sekunde.
///
/// Der letzte Fix liegt exakt auf dem Endpunkt.
pub fn positions_along(
    polyline: &[Coordinate],
    spacing_m: f64,
    speed_mps: f64,
    start_ms: u64,
) -> Vec<Position> {
    let total = polyline_length(polyline);
    let mut out = Vec::new();
    let mut d: f64 = 0.0;
    let mut i = 0u64;
    loop {
        let here = point_along(polyline, d.min(total)).unwrap();
        let ahead = point_along(polyline, (d + 1.0).min(total)).unwrap();
        let mut position = Position::at(here, start_ms + i * 1_000).with_speed(speed_mps);
        if haversine_distance(here, ahead) > 0.01 {
            position = position.with_heading(initial_bearing(here, ahead));
        }
        out.push(position);
        if d >= total {
            break;
        }
        d = (d + spacing_m).min(total);
        i += 1;
    }
    out
}
