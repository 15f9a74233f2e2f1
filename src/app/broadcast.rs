//! Ausgehende Event-Streams als `watch`-Kanäle (mehrere Abonnenten, nur der letzte Wert).

use tokio::sync::watch;

use super::state::NavigationState;
use super::tracker::ArrivalEvent;
use crate::core::{CameraParameters, RouteProgress, UpcomingManeuver};
use crate::error::NavError;

/// Besitzt die Sender aller Streams; Abonnenten holen sich Receiver.
///
/// Senden funktioniert auch ohne Abonnenten, späte Abonnenten sehen nur den
/// letzten Wert.
#[derive(Debug)]
pub struct NavigationStreams {
    state: watch::Sender<NavigationState>,
    progress: watch::Sender<Option<RouteProgress>>,
    maneuver: watch::Sender<Option<UpcomingManeuver>>,
    instruction: watch::Sender<Option<String>>,
    arrival: watch::Sender<Option<ArrivalEvent>>,
    error: watch::Sender<Option<NavError>>,
    camera: watch::Sender<Option<CameraParameters>>,
}

impl Default for NavigationStreams {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationStreams {
    /// Erstellt alle Kanäle mit Leer-Werten
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(NavigationState::Idle),
            progress: watch::Sender::new(None),
            maneuver: watch::Sender::new(None),
            instruction: watch::Sender::new(None),
            arrival: watch::Sender::new(None),
            error: watch::Sender::new(None),
            camera: watch::Sender::new(None),
        }
    }

    /// Navigationszustand
    pub fn subscribe_state(&self) -> watch::Receiver<NavigationState> {
        self.state.subscribe()
    }

    /// Routenfortschritt
    pub fn subscribe_progress(&self) -> watch::Receiver<Option<RouteProgress>> {
        self.progress.subscribe()
    }

    /// Nächstes Manöver
    pub fn subscribe_maneuver(&self) -> watch::Receiver<Option<UpcomingManeuver>> {
        self.maneuver.subscribe()
    }

    /// Anweisungstexte
    pub fn subscribe_instruction(&self) -> watch::Receiver<Option<String>> {
        self.instruction.subscribe()
    }

    /// Ankunft (wird pro Sitzung höchstens einmal gesetzt)
    pub fn subscribe_arrival(&self) -> watch::Receiver<Option<ArrivalEvent>> {
        self.arrival.subscribe()
    }

    /// Fehler
    pub fn subscribe_error(&self) -> watch::Receiver<Option<NavError>> {
        self.error.subscribe()
    }

    /// Kamera-Parameter
    pub fn subscribe_camera(&self) -> watch::Receiver<Option<CameraParameters>> {
        self.camera.subscribe()
    }

    /// Aktueller Zustand (ohne Abo)
    pub fn current_state(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    pub(crate) fn publish_state(&self, state: &NavigationState) {
        self.state.send_replace(state.clone());
    }

    pub(crate) fn publish_progress(&self, progress: Option<RouteProgress>) {
        self.progress.send_replace(progress);
    }

    /// Sendet nur bei Wechsel des Manövers oder geänderter Distanz.
    pub(crate) fn publish_maneuver(&self, maneuver: Option<UpcomingManeuver>) {
        self.maneuver.send_if_modified(|current| {
            if *current == maneuver {
                return false;
            }
            *current = maneuver;
            true
        });
    }

    pub(crate) fn publish_instruction(&self, text: String) {
        self.instruction.send_replace(Some(text));
    }

    pub(crate) fn publish_arrival(&self, arrival: ArrivalEvent) {
        self.arrival.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(arrival);
            true
        });
    }

    pub(crate) fn publish_error(&self, error: Option<NavError>) {
        self.error.send_if_modified(|current| {
            if *current == error {
                return false;
            }
            *current = error;
            true
        });
    }

    pub(crate) fn publish_camera(&self, params: CameraParameters) {
        self.camera.send_replace(Some(params));
    }

    /// Neue Sitzung: Fortschritt, Manöver, Anweisung und Ankunft leeren.
    pub(crate) fn clear_session(&self) {
        self.progress.send_replace(None);
        self.maneuver.send_replace(None);
        self.instruction.send_replace(None);
        self.arrival.send_replace(None);
    }
}
