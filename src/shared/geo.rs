//! Reine Geometrie-Funktionen auf WGS84-Koordinaten.
//!
//! Layer-neutral: Großkreis-Distanz, Peilung, Punkt-zu-Polyline-Abstand und
//! Winkelarithmetik. Kann von `core` und `app` importiert werden ohne
//! Zirkel-Abhängigkeiten zu erzeugen.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Mittlerer Erdradius in Metern (WGS84).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Geographische Koordinate in Grad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Breite in Grad
    pub lat: f64,
    /// Länge in Grad
    pub lon: f64,
}

impl Coordinate {
    /// Erstellt eine neue Koordinate
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Endlich und im Wertebereich [-90,90] × [-180,180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Haversine-Distanz zwischen zwei Koordinaten in Metern.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Anfangspeilung von `a` nach `b` in Grad [0, 360).
pub fn initial_bearing(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    normalize_angle(y.atan2(x).to_degrees())
}

/// Zielpunkt bei gegebener Startkoordinate, Peilung (Grad) und Distanz (Meter).
pub fn destination_point(origin: Coordinate, bearing_deg: f64, distance_m: f64) -> Coordinate {
    let delta = distance_m / EARTH_RADIUS_M;
    let theta = bearing_deg.to_radians();
    let lat1 = origin.lat.to_radians();
    let lon1 = origin.lon.to_radians();

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    Coordinate::new(lat2.to_degrees(), normalize_longitude(lon2.to_degrees()))
}

fn normalize_longitude(lon: f64) -> f64 {
    (lon + 540.0).rem_euclid(360.0) - 180.0
}

/// Lineare Interpolation in Grad (ausreichend für kurze Segmente).
pub fn interpolate(a: Coordinate, b: Coordinate, t: f64) -> Coordinate {
    Coordinate::new(a.lat + (b.lat - a.lat) * t, a.lon + (b.lon - a.lon) * t)
}

/// Normalisiert einen Winkel auf [0, 360).
pub fn normalize_angle(deg: f64) -> f64 {
    let n = deg.rem_euclid(360.0);
    // rem_euclid kann bei -1e-14 genau 360.0 liefern
    if n >= 360.0 {
        0.0
    } else {
        n
    }
}

/// Kürzeste Winkeldifferenz von `from` nach `to` in [-180, 180].
///
/// Positiv = im Uhrzeigersinn (Rechtsdrehung).
pub fn heading_diff(from: f64, to: f64) -> f64 {
    let mut d = normalize_angle(to) - normalize_angle(from);
    if d > 180.0 {
        d -= 360.0;
    } else if d < -180.0 {
        d += 360.0;
    }
    d
}

/// Interpoliert zwischen zwei Kursen entlang des kürzeren Bogens.
pub fn interpolate_heading(from: f64, to: f64, t: f64) -> f64 {
    normalize_angle(from + heading_diff(from, to) * t)
}

/// Lokale, planare Projektion (equirektangulär) um einen Ursprung in Metern.
///
/// x = Ost, y = Nord. Genau genug für Abstände im Bereich weniger Kilometer.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    origin: Coordinate,
    meters_per_deg_lat: f64,
    meters_per_deg_lon: f64,
}

impl LocalFrame {
    /// Erstellt eine Projektion um `origin`.
    pub fn new(origin: Coordinate) -> Self {
        let meters_per_deg_lat = EARTH_RADIUS_M.to_radians();
        Self {
            origin,
            meters_per_deg_lat,
            meters_per_deg_lon: meters_per_deg_lat * origin.lat.to_radians().cos(),
        }
    }

    /// Koordinate → lokale Meter
    pub fn to_local(&self, c: Coordinate) -> DVec2 {
        DVec2::new(
            (c.lon - self.origin.lon) * self.meters_per_deg_lon,
            (c.lat - self.origin.lat) * self.meters_per_deg_lat,
        )
    }

    /// Lokale Meter → Koordinate
    pub fn to_coordinate(&self, p: DVec2) -> Coordinate {
        let lon = if self.meters_per_deg_lon.abs() < f64::EPSILON {
            self.origin.lon
        } else {
            self.origin.lon + p.x / self.meters_per_deg_lon
        };
        Coordinate::new(self.origin.lat + p.y / self.meters_per_deg_lat, lon)
    }
}

/// Projektion eines Punkts auf ein Segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Nächster Punkt auf dem Segment
    pub point: Coordinate,
    /// Segment-Parameter t ∈ [0, 1]
    pub t: f64,
    /// Abstand Punkt → Segment in Metern
    pub distance_m: f64,
}

/// Projiziert `p` auf das Segment `a`–`b`.
///
/// Die Projektion läuft planar um `a`; der Abstand wird anschließend
/// per Haversine gemessen. Punkte, die durch lineare Interpolation auf dem
/// Segment entstanden sind, liefern damit Abstand ~0.
pub fn project_on_segment(p: Coordinate, a: Coordinate, b: Coordinate) -> SegmentProjection {
    let frame = LocalFrame::new(a);
    let pb = frame.to_local(b);
    let pp = frame.to_local(p);

    let len_sq = pb.length_squared();
    let t = if len_sq < 1e-12 {
        0.0
    } else {
        (pp.dot(pb) / len_sq).clamp(0.0, 1.0)
    };

    let point = interpolate(a, b, t);
    SegmentProjection {
        point,
        t,
        distance_m: haversine_distance(p, point),
    }
}

/// Ergebnis der Projektion auf eine Polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylineProjection {
    /// Nächster Punkt auf der Polyline
    pub point: Coordinate,
    /// Index des Segment-Startpunkts
    pub segment_index: usize,
    /// Abstand Punkt → Polyline in Metern
    pub distance_m: f64,
    /// Distanz entlang der Polyline bis zum projizierten Punkt
    pub distance_along_m: f64,
}

/// Projiziert `p` auf die nächstgelegene Stelle einer Polyline.
///
/// `None` bei leerer Polyline; eine einzelne Koordinate gilt als Punkt.
pub fn project_on_polyline(p: Coordinate, polyline: &[Coordinate]) -> Option<PolylineProjection> {
    match polyline {
        [] => None,
        [only] => Some(PolylineProjection {
            point: *only,
            segment_index: 0,
            distance_m: haversine_distance(p, *only),
            distance_along_m: 0.0,
        }),
        _ => {
            let mut best: Option<PolylineProjection> = None;
            let mut along = 0.0;
            for (i, seg) in polyline.windows(2).enumerate() {
                let proj = project_on_segment(p, seg[0], seg[1]);
                let seg_len = haversine_distance(seg[0], seg[1]);
                if best.is_none_or(|b| proj.distance_m < b.distance_m) {
                    best = Some(PolylineProjection {
                        point: proj.point,
                        segment_index: i,
                        distance_m: proj.distance_m,
                        distance_along_m: along + seg_len * proj.t,
                    });
                }
                along += seg_len;
            }
            best
        }
    }
}

/// Abstand eines Punkts zur Polyline in Metern (`f64::INFINITY` bei leerer Polyline).
pub fn distance_to_polyline(p: Coordinate, polyline: &[Coordinate]) -> f64 {
    project_on_polyline(p, polyline)
        .map(|proj| proj.distance_m)
        .unwrap_or(f64::INFINITY)
}

/// Länge einer Polyline in Metern.
pub fn polyline_length(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(w[0], w[1]))
        .sum()
}

/// Punkt in Distanz `distance_m` entlang der Polyline (geklemmt auf die Enden).
pub fn point_along(points: &[Coordinate], distance_m: f64) -> Option<Coordinate> {
    let first = *points.first()?;
    if distance_m <= 0.0 {
        return Some(first);
    }
    let mut remaining = distance_m;
    for w in points.windows(2) {
        let len = haversine_distance(w[0], w[1]);
        if remaining <= len {
            let t = if len > 0.0 { remaining / len } else { 0.0 };
            return Some(interpolate(w[0], w[1], t));
        }
        remaining -= len;
    }
    points.last().copied()
}
