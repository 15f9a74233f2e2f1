//! Unveränderliches Routenmodell: Legs, Steps, Manöver und Geometrie.
//!
//! Eine Neuberechnung ersetzt das Modell komplett (`Arc<RouteModel>`),
//! es wird nie mutiert.

use serde::{Deserialize, Serialize};

use super::lookahead;
use super::spatial::RouteIndex;
use super::{Maneuver, Position};
use crate::error::NavError;
use crate::shared::geo::{self, Coordinate};

/// Einzelner Routenabschnitt, beginnend mit einem Manöver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Manöver am Beginn des Steps
    pub maneuver: Maneuver,
    /// Länge in Metern (laut Provider)
    pub distance: f64,
    /// Dauer in Sekunden (laut Provider)
    pub duration: f64,
    /// Polyline des Steps
    pub geometry: Vec<Coordinate>,
    /// Straßenname
    #[serde(default)]
    pub name: Option<String>,
}

/// Routenabschnitt zwischen zwei Wegpunkten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    /// Steps in Fahrreihenfolge
    pub steps: Vec<Step>,
    /// Kurzbeschreibung
    #[serde(default)]
    pub summary: Option<String>,
}

impl Leg {
    /// Summe der Step-Distanzen
    pub fn distance(&self) -> f64 {
        self.steps.iter().map(|s| s.distance).sum()
    }

    /// Summe der Step-Dauern
    pub fn duration(&self) -> f64 {
        self.steps.iter().map(|s| s.duration).sum()
    }
}

/// Serialisierte Form einer Route (Fixtures, Replay-Dateien).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RouteDocument {
    legs: Vec<Leg>,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
}

/// Nächster Punkt der Route zu einer Position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSnap {
    /// Projizierter Punkt auf der Route
    pub point: Coordinate,
    /// Abstand der Position zur Route
    pub distance_from_route: f64,
    /// Leg-Index
    pub leg_index: usize,
    /// Step-Index im Leg
    pub step_index: usize,
    /// Fortlaufender Step-Index über alle Legs
    pub flat_step_index: usize,
    /// Zurückgelegte Distanz im Step
    pub distance_along_step: f64,
    /// Zurückgelegte Distanz im Leg
    pub distance_along_leg: f64,
    /// Zurückgelegte Distanz auf der Route
    pub distance_along_route: f64,
}

/// Vorberechnete Lage eines Steps in der Route.
#[derive(Debug, Clone)]
struct StepSlot {
    leg: usize,
    step: usize,
    route_offset: f64,
    leg_offset: f64,
    geometric_length: f64,
}

/// Segment der flachen Routen-Polyline.
#[derive(Debug, Clone)]
struct RouteSegment {
    a: Coordinate,
    b: Coordinate,
    flat_step: usize,
    step_offset_geo: f64,
    length: f64,
}

/// Vollständige, validierte Route.
#[derive(Debug, Clone)]
pub struct RouteModel {
    legs: Vec<Leg>,
    distance: f64,
    duration: f64,
    leg_offsets: Vec<f64>,
    slots: Vec<StepSlot>,
    segments: Vec<RouteSegment>,
    index: RouteIndex,
}

/// Toleranz für die Distanz-Summenprüfung.
fn sum_tolerance(total: f64) -> f64 {
    (total * 0.001).max(0.5)
}

impl RouteModel {
    /// Baut eine Route aus Legs und prüft die Invarianten.
    ///
    /// Maneuver-Indizes werden aus der Position in Leg/Step neu gesetzt.
    pub fn new(legs: Vec<Leg>) -> Result<Self, NavError> {
        Self::with_declared_totals(legs, None, None)
    }

    /// Wie [`RouteModel::new`], prüft zusätzlich gegen die Gesamtwerte des Providers.
    pub fn with_declared_totals(
        mut legs: Vec<Leg>,
        declared_distance: Option<f64>,
        declared_duration: Option<f64>,
    ) -> Result<Self, NavError> {
        if legs.is_empty() {
            return Err(NavError::InvalidInput("Route ohne Legs".into()));
        }

        for (leg_index, leg) in legs.iter_mut().enumerate() {
            if leg.steps.is_empty() {
                return Err(NavError::InvalidInput(format!("Leg {leg_index} ohne Steps")));
            }
            for (step_index, step) in leg.steps.iter_mut().enumerate() {
                validate_step(step, leg_index, step_index)?;
                step.maneuver.leg_index = leg_index;
                step.maneuver.step_index = step_index;
            }
        }

        let distance: f64 = legs.iter().map(Leg::distance).sum();
        let duration: f64 = legs.iter().map(Leg::duration).sum();

        if let Some(declared) = declared_distance {
            if !declared.is_finite() || (declared - distance).abs() > sum_tolerance(declared) {
                return Err(NavError::InvalidInput(format!(
                    "Step-Distanzen ({distance:.1} m) passen nicht zur Gesamtdistanz ({declared:.1} m)"
                )));
            }
        }
        if let Some(declared) = declared_duration {
            if !declared.is_finite() || (declared - duration).abs() > sum_tolerance(declared) {
                return Err(NavError::InvalidInput(format!(
                    "Step-Dauern ({duration:.1} s) passen nicht zur Gesamtdauer ({declared:.1} s)"
                )));
            }
        }

        let mut leg_offsets = Vec::with_capacity(legs.len());
        let mut slots = Vec::new();
        let mut segments = Vec::new();
        let mut route_offset = 0.0;

        for (leg_index, leg) in legs.iter().enumerate() {
            leg_offsets.push(route_offset);
            let mut leg_offset = 0.0;
            for (step_index, step) in leg.steps.iter().enumerate() {
                let flat_step = slots.len();
                let mut step_offset_geo = 0.0;
                if step.geometry.len() == 1 {
                    segments.push(RouteSegment {
                        a: step.geometry[0],
                        b: step.geometry[0],
                        flat_step,
                        step_offset_geo: 0.0,
                        length: 0.0,
                    });
                }
                for w in step.geometry.windows(2) {
                    let length = geo::haversine_distance(w[0], w[1]);
                    segments.push(RouteSegment {
                        a: w[0],
                        b: w[1],
                        flat_step,
                        step_offset_geo,
                        length,
                    });
                    step_offset_geo += length;
                }
                slots.push(StepSlot {
                    leg: leg_index,
                    step: step_index,
                    route_offset,
                    leg_offset,
                    geometric_length: step_offset_geo,
                });
                route_offset += step.distance;
                leg_offset += step.distance;
            }
        }

        let index = RouteIndex::from_segments(
            &segments.iter().map(|s| (s.a, s.b)).collect::<Vec<_>>(),
        );

        log::debug!(
            "RouteModel aufgebaut: {} Legs, {} Steps, {} Segmente, {:.0} m",
            legs.len(),
            slots.len(),
            segments.len(),
            distance
        );

        Ok(Self {
            legs,
            distance,
            duration,
            leg_offsets,
            slots,
            segments,
            index,
        })
    }

    /// Parst eine Route aus JSON (`{"legs": [...], "distance": .., "duration": ..}`).
    pub fn from_json(json: &str) -> Result<Self, NavError> {
        let doc: RouteDocument = serde_json::from_str(json)
            .map_err(|e| NavError::InvalidInput(format!("Routen-JSON fehlerhaft: {e}")))?;
        Self::with_declared_totals(doc.legs, doc.distance, doc.duration)
    }

    /// Serialisiert die Route als JSON.
    pub fn to_json(&self) -> Result<String, NavError> {
        let doc = RouteDocument {
            legs: self.legs.clone(),
            distance: Some(self.distance),
            duration: Some(self.duration),
        };
        serde_json::to_string_pretty(&doc).map_err(|e| NavError::Internal(e.to_string()))
    }

    /// Alle Legs
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Gesamtdistanz in Metern
    pub fn total_distance(&self) -> f64 {
        self.distance
    }

    /// Gesamtdauer in Sekunden
    pub fn total_duration(&self) -> f64 {
        self.duration
    }

    /// Anzahl Steps über alle Legs
    pub fn step_count(&self) -> usize {
        self.slots.len()
    }

    /// Step über Leg- und Step-Index
    pub fn step(&self, leg_index: usize, step_index: usize) -> Option<&Step> {
        self.legs.get(leg_index)?.steps.get(step_index)
    }

    /// Step über fortlaufenden Index
    pub fn step_at(&self, flat_index: usize) -> Option<&Step> {
        let slot = self.slots.get(flat_index)?;
        self.step(slot.leg, slot.step)
    }

    /// Fortlaufender Index eines Steps
    pub fn flat_index(&self, leg_index: usize, step_index: usize) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.leg == leg_index && s.step == step_index)
    }

    /// Routendistanz am Beginn des Steps (fortlaufender Index)
    pub fn step_route_offset(&self, flat_index: usize) -> Option<f64> {
        self.slots.get(flat_index).map(|s| s.route_offset)
    }

    /// Routendistanz am Beginn eines Legs
    pub fn leg_offset(&self, leg_index: usize) -> Option<f64> {
        self.leg_offsets.get(leg_index).copied()
    }

    /// Startpunkt der Route
    pub fn origin(&self) -> Coordinate {
        self.segments
            .first()
            .map(|s| s.a)
            .unwrap_or(Coordinate::new(0.0, 0.0))
    }

    /// Zielpunkt der Route
    pub fn destination(&self) -> Coordinate {
        self.segments
            .last()
            .map(|s| s.b)
            .unwrap_or(Coordinate::new(0.0, 0.0))
    }

    /// Zielpunkte aller Legs (Zwischenziele + Ziel)
    pub fn waypoints(&self) -> Vec<Coordinate> {
        self.legs
            .iter()
            .filter_map(|leg| leg.steps.last()?.geometry.last().copied())
            .collect()
    }

    /// Gesamte Polyline ohne doppelte Stoßpunkte
    pub fn polyline(&self) -> Vec<Coordinate> {
        let mut line: Vec<Coordinate> = Vec::with_capacity(self.segments.len() + 1);
        for seg in &self.segments {
            if line.last() != Some(&seg.a) {
                line.push(seg.a);
            }
            if line.last() != Some(&seg.b) {
                line.push(seg.b);
            }
        }
        line
    }

    /// Teilt die Polyline am projizierten Punkt in gefahren / verbleibend.
    pub fn split_polyline(&self, snap: &RouteSnap) -> (Vec<Coordinate>, Vec<Coordinate>) {
        let mut traveled = Vec::new();
        let mut remaining = vec![snap.point];
        let mut passed = false;

        for seg in &self.segments {
            let seg_end_route = self.slots[seg.flat_step].route_offset
                + self.scale_to_step(seg.flat_step, seg.step_offset_geo + seg.length);
            if !passed && seg_end_route <= snap.distance_along_route {
                if traveled.last() != Some(&seg.a) {
                    traveled.push(seg.a);
                }
                if traveled.last() != Some(&seg.b) {
                    traveled.push(seg.b);
                }
                continue;
            }
            if !passed {
                passed = true;
                if traveled.last() != Some(&seg.a) {
                    traveled.push(seg.a);
                }
                traveled.push(snap.point);
            }
            if remaining.last() != Some(&seg.b) {
                remaining.push(seg.b);
            }
        }
        if !passed {
            traveled.push(snap.point);
        }
        (traveled, remaining)
    }

    fn scale_to_step(&self, flat_step: usize, geo_along: f64) -> f64 {
        let slot = &self.slots[flat_step];
        let declared = self.legs[slot.leg].steps[slot.step].distance;
        if slot.geometric_length > 1e-6 {
            (geo_along / slot.geometric_length).clamp(0.0, 1.0) * declared
        } else {
            0.0
        }
    }

    /// Projiziert eine Koordinate auf die Route.
    pub fn snap(&self, coordinate: Coordinate) -> Option<RouteSnap> {
        let mut best: Option<(usize, geo::SegmentProjection)> = None;
        for seg_index in self.index.candidates(coordinate) {
            let seg = &self.segments[seg_index];
            let proj = geo::project_on_segment(coordinate, seg.a, seg.b);
            if best.is_none_or(|(_, b)| proj.distance_m < b.distance_m) {
                best = Some((seg_index, proj));
            }
        }

        let (seg_index, proj) = best?;
        let seg = &self.segments[seg_index];
        let slot = &self.slots[seg.flat_step];
        let along_step = self.scale_to_step(seg.flat_step, seg.step_offset_geo + seg.length * proj.t);

        Some(RouteSnap {
            point: proj.point,
            distance_from_route: proj.distance_m,
            leg_index: slot.leg,
            step_index: slot.step,
            flat_step_index: seg.flat_step,
            distance_along_step: along_step,
            distance_along_leg: slot.leg_offset + along_step,
            distance_along_route: slot.route_offset + along_step,
        })
    }

    /// Prüft ob eine Position innerhalb `tolerance_m` auf der Routengeometrie liegt.
    pub fn is_on_path(&self, position: &Position, tolerance_m: f64) -> bool {
        self.snap(position.coordinate())
            .is_some_and(|s| s.distance_from_route <= tolerance_m)
    }

    /// Aktueller Step im Leg der Position anhand der im Leg zurückgelegten Distanz.
    pub fn current_step(&self, position: &Position, distance_traveled_in_leg: f64) -> Option<&Step> {
        let snap = self.snap(position.coordinate())?;
        let leg = self.legs.get(snap.leg_index)?;
        let mut end = 0.0;
        for step in &leg.steps {
            end += step.distance;
            if distance_traveled_in_leg < end {
                return Some(step);
            }
        }
        leg.steps.last()
    }

    /// Nachfolger eines Steps, auch über Leg-Grenzen hinweg.
    pub fn next_step(&self, step: &Step) -> Option<&Step> {
        let leg_index = step.maneuver.leg_index;
        let step_index = step.maneuver.step_index;
        let leg = self.legs.get(leg_index)?;
        if step_index + 1 < leg.steps.len() {
            return leg.steps.get(step_index + 1);
        }
        self.legs.get(leg_index + 1)?.steps.first()
    }

    /// Verbleibende Distanz bis zum Ziel (Gesamtdistanz, falls nicht projizierbar).
    pub fn remaining_distance(&self, position: &Position) -> f64 {
        self.snap(position.coordinate())
            .map(|s| (self.distance - s.distance_along_route).max(0.0))
            .unwrap_or(self.distance)
    }

    /// Verbleibende Dauer bis zum Ziel in Sekunden.
    pub fn remaining_duration(&self, position: &Position) -> f64 {
        self.snap(position.coordinate())
            .map(|s| self.remaining_durations(&s).0)
            .unwrap_or(self.duration)
    }

    /// Verbleibende Dauer (Route, Leg) ab einem projizierten Punkt.
    pub fn remaining_durations(&self, snap: &RouteSnap) -> (f64, f64) {
        let mut route_remaining = 0.0;
        let mut leg_remaining = 0.0;
        for (flat, slot) in self.slots.iter().enumerate().skip(snap.flat_step_index) {
            let step = &self.legs[slot.leg].steps[slot.step];
            let part = if flat == snap.flat_step_index {
                let fraction = if step.distance > 1e-6 {
                    (1.0 - snap.distance_along_step / step.distance).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                step.duration * fraction
            } else {
                step.duration
            };
            route_remaining += part;
            if slot.leg == snap.leg_index {
                leg_remaining += part;
            }
        }
        (route_remaining, leg_remaining)
    }

    /// Nächster anzusagender Step, inkl. Zusammenfassung komplexer Sequenzen.
    pub fn upcoming_step(
        &self,
        position: &Position,
        distance_traveled: f64,
        speed: f64,
    ) -> Option<&Step> {
        let snap = self.snap(position.coordinate())?;
        lookahead::look_ahead(self, snap.flat_step_index, distance_traveled, speed)
            .map(|ahead| ahead.step)
    }
}

fn validate_step(step: &Step, leg_index: usize, step_index: usize) -> Result<(), NavError> {
    let at = format!("Leg {leg_index}, Step {step_index}");
    if !step.distance.is_finite() || step.distance < 0.0 {
        return Err(NavError::InvalidInput(format!("{at}: ungueltige Distanz")));
    }
    if !step.duration.is_finite() || step.duration < 0.0 {
        return Err(NavError::InvalidInput(format!("{at}: ungueltige Dauer")));
    }
    if step.geometry.is_empty() {
        return Err(NavError::InvalidInput(format!("{at}: leere Geometrie")));
    }
    if step.geometry.iter().any(|c| !c.is_valid()) || !step.maneuver.location.is_valid() {
        return Err(NavError::InvalidInput(format!("{at}: ungueltige Koordinate")));
    }
    Ok(())
}
