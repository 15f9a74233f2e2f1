//! Fortschrittsverfolgung: Fortschritt, Abweichung, Ansagen und Ankunft pro Position.

use std::collections::HashMap;

use serde::Serialize;

use crate::core::{
    format_instruction, AnnouncementUrgency, Maneuver, Position, RouteModel, RouteProgress,
};
use crate::shared::geo::{haversine_distance, Coordinate};
use crate::shared::{ArrivalPolicy, TrackerOptions};

/// Abweichung von der Route (wird nur gemeldet, nicht gespeichert)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteDeviation {
    /// Position der Abweichung
    pub position: Position,
    /// Abstand zur Route
    pub distance_from_route: f64,
    /// Zeitstempel
    pub timestamp_ms: u64,
}

/// Anzusagendes Manöver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManeuverAnnouncement {
    /// Manöver
    pub maneuver: Maneuver,
    /// Fortlaufender Step-Index
    pub flat_step_index: usize,
    /// Straßenname nach dem Manöver
    pub street_name: Option<String>,
    /// Distanz bis zum Manöver
    pub distance_m: f64,
    /// Dringlichkeit
    #[serde(skip)]
    pub urgency: AnnouncementUrgency,
    /// Übernächstes Manöver vorgezogen
    pub complex_sequence: bool,
    /// Fertiger Ansagetext
    pub text: String,
}

/// Ankunft am Ziel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrivalEvent {
    /// Position bei Ankunft
    pub position: Position,
    /// Restdistanz entlang der Route
    pub distance_remaining: f64,
    /// Direkte Distanz zum Ziel
    pub distance_to_destination: f64,
}

/// Ergebnis einer Positionsverarbeitung
#[derive(Debug, Clone, Default)]
pub struct TrackerOutput {
    /// Berechneter Fortschritt (`None` = noch nicht verfügbar)
    pub progress: Option<RouteProgress>,
    /// Fortschritt hat sich deutlich geändert und soll gesendet werden
    pub emit_progress: bool,
    /// Abweichung über der Schwelle
    pub deviation: Option<RouteDeviation>,
    /// Fällige Ansage
    pub announcement: Option<ManeuverAnnouncement>,
    /// Ankunft (höchstens einmal pro Sitzung)
    pub arrival: Option<ArrivalEvent>,
}

/// Eingangsgrößen der Ankunftsprüfung
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrivalCheck {
    /// Abstand zur Route
    pub distance_from_route: f64,
    /// Restdistanz entlang der Route
    pub distance_remaining: f64,
    /// Direkte Distanz zum Ziel
    pub distance_to_destination: f64,
    /// Momentane Geschwindigkeit, falls bekannt
    pub speed_mps: Option<f64>,
    /// Kein vorheriger Fix oder kein Zeitabstand
    pub first_fix: bool,
}

impl ArrivalPolicy {
    /// Geschichtete Ankunftsprüfung; die Reihenfolge der Wächter ist fest.
    pub fn is_arrival(&self, check: &ArrivalCheck) -> bool {
        if check.distance_from_route > self.max_off_route_m {
            return false;
        }
        if check.distance_remaining > self.remaining_gate_m {
            return false;
        }
        if check.distance_to_destination > self.direct_gate_m {
            return false;
        }

        let close = check.distance_remaining <= self.trigger_remaining_m
            && check.distance_to_destination <= self.trigger_direct_m;
        let near_route = check.distance_from_route <= self.trigger_off_route_m;
        let slow = near_route
            && check.speed_mps.is_some_and(|s| s < self.slow_speed_mps)
            && check.distance_to_destination <= self.slow_direct_m;
        let first = near_route
            && check.first_fix
            && check.distance_remaining <= self.first_fix_remaining_m
            && check.distance_to_destination <= self.first_fix_direct_m;
        close || slow || first
    }
}

#[derive(Debug, Clone, Copy)]
struct AnnounceRecord {
    at_ms: u64,
}

#[derive(Debug, Clone)]
struct TrackingState {
    started_ms: u64,
    last_position: Option<Position>,
    last_progress: Option<RouteProgress>,
    last_emitted: Option<(Coordinate, f64)>,
    announced: HashMap<usize, AnnounceRecord>,
    arrived: bool,
}

impl TrackingState {
    fn new(started_ms: u64) -> Self {
        Self {
            started_ms,
            last_position: None,
            last_progress: None,
            last_emitted: None,
            announced: HashMap::new(),
            arrived: false,
        }
    }
}

#[derive(Debug, Clone)]
enum TrackerPhase {
    Idle,
    Tracking(TrackingState),
}

/// Verfolgt den Fortschritt einer aktiven Sitzung (`Idle` | `Tracking`).
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    options: TrackerOptions,
    arrival: ArrivalPolicy,
    phase: TrackerPhase,
}

impl ProgressTracker {
    /// Erstellt einen Tracker im Zustand `Idle`
    pub fn new(options: TrackerOptions, arrival: ArrivalPolicy) -> Self {
        Self {
            options,
            arrival,
            phase: TrackerPhase::Idle,
        }
    }

    /// Läuft die Verfolgung?
    pub fn is_tracking(&self) -> bool {
        matches!(self.phase, TrackerPhase::Tracking(_))
    }

    /// Wurde die Ankunft bereits gemeldet?
    pub fn has_arrived(&self) -> bool {
        matches!(&self.phase, TrackerPhase::Tracking(t) if t.arrived)
    }

    /// Zuletzt berechneter Fortschritt
    pub fn last_progress(&self) -> Option<&RouteProgress> {
        match &self.phase {
            TrackerPhase::Tracking(t) => t.last_progress.as_ref(),
            TrackerPhase::Idle => None,
        }
    }

    /// Startet die Verfolgung; merkt sich den Startzeitpunkt.
    pub fn start_tracking(&mut self, now_ms: u64) {
        if self.is_tracking() {
            log::warn!("ProgressTracker: start_tracking während aktiver Verfolgung, Zustand neu");
        }
        self.phase = TrackerPhase::Tracking(TrackingState::new(now_ms));
    }

    /// Beendet die Verfolgung und verwirft alle Zustände.
    pub fn stop_tracking(&mut self) {
        self.phase = TrackerPhase::Idle;
    }

    /// Neue Route nach Neuberechnung: Fortschritts-Basis und Ansagen zurücksetzen.
    ///
    /// Startzeit und Ankunfts-Latch bleiben erhalten.
    pub fn replace_route(&mut self) {
        if let TrackerPhase::Tracking(t) = &mut self.phase {
            t.last_progress = None;
            t.last_emitted = None;
            t.announced.clear();
        }
    }

    /// Verarbeitet eine Position gegen die aktuelle Route.
    pub fn update(&mut self, route: &RouteModel, position: &Position) -> TrackerOutput {
        let options = &self.options;
        let arrival_policy = &self.arrival;
        let TrackerPhase::Tracking(state) = &mut self.phase else {
            return TrackerOutput::default();
        };

        let previous = state.last_position;
        if previous.is_none() && position.timestamp_ms < state.started_ms {
            // Quelle mit anderer Zeitbasis: Messung beginnt am ersten Fix
            state.started_ms = position.timestamp_ms;
        }
        let speed = position.speed_or_derived(previous.as_ref());
        let elapsed_ms = position.timestamp_ms.saturating_sub(state.started_ms);

        let Some(progress) = RouteProgress::compute(
            route,
            position,
            elapsed_ms,
            options.on_route_tolerance_m,
            speed.unwrap_or(0.0),
        ) else {
            log::debug!("ProgressTracker: kein Fortschritt für Position berechenbar");
            return TrackerOutput::default();
        };
        state.last_position = Some(*position);

        let mut out = TrackerOutput::default();

        if !progress.on_route && progress.distance_from_route > options.deviation_threshold_m {
            out.deviation = Some(RouteDeviation {
                position: *position,
                distance_from_route: progress.distance_from_route,
                timestamp_ms: position.timestamp_ms,
            });
        }

        out.announcement = announcement_for(options, state, &progress, position.timestamp_ms);

        if !state.arrived {
            let first_fix =
                previous.is_none_or(|p| p.timestamp_ms >= position.timestamp_ms);
            let check = ArrivalCheck {
                distance_from_route: progress.distance_from_route,
                distance_remaining: progress.distance_remaining,
                distance_to_destination: progress.distance_to_destination,
                speed_mps: speed,
                first_fix,
            };
            if arrival_policy.is_arrival(&check) {
                state.arrived = true;
                log::info!(
                    "Ankunft erkannt: {:.1} m Rest, {:.1} m direkt",
                    check.distance_remaining,
                    check.distance_to_destination
                );
                out.arrival = Some(ArrivalEvent {
                    position: *position,
                    distance_remaining: progress.distance_remaining,
                    distance_to_destination: progress.distance_to_destination,
                });
            }
        }

        out.emit_progress = match state.last_emitted {
            None => true,
            Some((at, ratio)) => {
                haversine_distance(at, progress.location) > options.progress_emit_distance_m
                    || (progress.fraction_traveled - ratio).abs() > options.progress_emit_ratio
            }
        };
        if out.emit_progress {
            state.last_emitted = Some((progress.location, progress.fraction_traveled));
        }

        state.last_progress = Some(progress.clone());
        out.progress = Some(progress);
        out
    }

    /// Periodischer Heartbeat: sendet erneut, wenn sich der Anteil leicht geändert hat.
    pub fn heartbeat(&mut self, now_ms: u64) -> Option<RouteProgress> {
        let TrackerPhase::Tracking(state) = &mut self.phase else {
            return None;
        };
        let progress = state.last_progress.as_mut()?;
        progress.elapsed_ms = now_ms.saturating_sub(state.started_ms);

        let changed = state.last_emitted.is_none_or(|(_, ratio)| {
            (progress.fraction_traveled - ratio).abs() > self.options.heartbeat_emit_ratio
        });
        if !changed {
            return None;
        }
        state.last_emitted = Some((progress.location, progress.fraction_traveled));
        Some(progress.clone())
    }
}

fn announcement_for(
    options: &TrackerOptions,
    state: &mut TrackingState,
    progress: &RouteProgress,
    now_ms: u64,
) -> Option<ManeuverAnnouncement> {
    let upcoming = progress.upcoming.as_ref()?;
    let urgency = upcoming.thresholds.urgency(upcoming.distance_m)?;

    if let Some(record) = state.announced.get(&upcoming.flat_step_index) {
        let since = now_ms.saturating_sub(record.at_ms);
        let urgent_allowed =
            since >= options.urgent_reannounce_ms && upcoming.distance_m <= options.urgent_distance_m;
        if since < options.reannounce_suppress_ms && !urgent_allowed {
            return None;
        }
    }

    state
        .announced
        .insert(upcoming.flat_step_index, AnnounceRecord { at_ms: now_ms });

    let text = format_instruction(
        &upcoming.maneuver,
        upcoming.distance_m,
        upcoming.street_name.as_deref(),
        urgency,
    );
    Some(ManeuverAnnouncement {
        maneuver: upcoming.maneuver.clone(),
        flat_step_index: upcoming.flat_step_index,
        street_name: upcoming.street_name.clone(),
        distance_m: upcoming.distance_m,
        urgency,
        complex_sequence: upcoming.complex_sequence,
        text,
    })
}
