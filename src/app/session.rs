//! Asynchrone Sitzung: ein Task besitzt Controller und Zustand.
//!
//! Befehle, Positionen, Routing-Ergebnisse und Timer laufen in einer
//! `select!`-Schleife zusammen; ein `CancellationToken` beendet alles.
//! Zeitstempel stammen aus der `SessionClock` (Zeitbasis der Fixes).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::broadcast::NavigationStreams;
use super::clock::SessionClock;
use super::collaborators::Collaborators;
use super::controller::NavigationController;
use super::events::{NavEffect, NavIntent};
use super::routing::{RouteProfile, RouteRequest, RoutingProvider};
use super::state::{NavigationState, SessionState};
use crate::core::{Position, RouteModel};
use crate::error::{LocationError, NavError};
use crate::shared::NavigationOptions;

const INBOX_CAPACITY: usize = 32;

type Reply = oneshot::Sender<Result<(), NavError>>;

enum SessionMessage {
    Start { request: RouteRequest, reply: Reply },
    Pause { reply: Reply },
    Resume { reply: Reply },
    Stop { reply: Reply },
    SetVoice { enabled: bool, reply: Reply },
    SetProfile { profile: RouteProfile, reply: Reply },
}

enum RouteResult {
    Initial {
        generation: u64,
        result: Result<RouteModel, NavError>,
    },
    Reroute {
        generation: u64,
        result: Result<RouteModel, NavError>,
    },
}

/// Griff auf eine laufende Sitzung. Klonbar; alle Klone sprechen mit
/// demselben Task.
#[derive(Clone)]
pub struct SessionHandle {
    inbox: mpsc::Sender<SessionMessage>,
    streams: Arc<NavigationStreams>,
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Startet die Navigation; kehrt zurück, sobald die Route berechnet ist
    /// oder die Berechnung scheitert.
    pub async fn start_navigation(&self, request: RouteRequest) -> Result<(), NavError> {
        self.request(|reply| SessionMessage::Start { request, reply })
            .await
    }

    /// Navigating → Paused
    pub async fn pause(&self) -> Result<(), NavError> {
        self.request(|reply| SessionMessage::Pause { reply }).await
    }

    /// Paused → Navigating
    pub async fn resume(&self) -> Result<(), NavError> {
        self.request(|reply| SessionMessage::Resume { reply }).await
    }

    /// Beendet die Navigation (→ Idle); die Sitzung läuft weiter.
    pub async fn stop(&self) -> Result<(), NavError> {
        self.request(|reply| SessionMessage::Stop { reply }).await
    }

    /// Sprachansagen schalten
    pub async fn set_voice_enabled(&self, enabled: bool) -> Result<(), NavError> {
        self.request(|reply| SessionMessage::SetVoice { enabled, reply })
            .await
    }

    /// Routenprofil für künftige Berechnungen
    pub async fn set_route_profile(&self, profile: RouteProfile) -> Result<(), NavError> {
        self.request(|reply| SessionMessage::SetProfile { profile, reply })
            .await
    }

    /// Ausgehende Streams
    pub fn streams(&self) -> &Arc<NavigationStreams> {
        &self.streams
    }

    /// Beendet den Sitzungs-Task samt aller Routing-Anfragen.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    async fn request(
        &self,
        build: impl FnOnce(Reply) -> SessionMessage,
    ) -> Result<(), NavError> {
        let (tx, rx) = oneshot::channel();
        self.inbox
            .send(build(tx))
            .await
            .map_err(|_| session_closed())?;
        rx.await.map_err(|_| session_closed())?
    }
}

fn session_closed() -> NavError {
    NavError::Internal("Sitzung ist beendet".into())
}

/// Sitzungs-Task. Wird nur über `spawn` erzeugt.
pub struct NavigationSession {
    controller: NavigationController,
    state: SessionState,
    provider: Arc<dyn RoutingProvider>,
    collaborators: Collaborators,
    inbox: mpsc::Receiver<SessionMessage>,
    positions: Option<mpsc::Receiver<Result<Position, LocationError>>>,
    route_tx: mpsc::UnboundedSender<RouteResult>,
    route_rx: mpsc::UnboundedReceiver<RouteResult>,
    routing_tasks: Vec<JoinHandle<()>>,
    pending_start: Option<(u64, Reply)>,
    clock: SessionClock,
    cancel: CancellationToken,
}

impl NavigationSession {
    /// Startet die Sitzung auf der aktuellen Tokio-Runtime.
    ///
    /// Das Schließen von `positions` ist ein normales Ende der Quelle;
    /// `Err`-Einträge sind Ausfälle der Ortung.
    pub fn spawn(
        options: NavigationOptions,
        provider: Arc<dyn RoutingProvider>,
        collaborators: Collaborators,
        positions: mpsc::Receiver<Result<Position, LocationError>>,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
        let (route_tx, route_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let streams = Arc::new(NavigationStreams::new());

        let session = Self {
            controller: NavigationController::new(),
            state: SessionState::with_streams(options, Arc::clone(&streams)),
            provider,
            collaborators,
            inbox: inbox_rx,
            positions: Some(positions),
            route_tx,
            route_rx,
            routing_tasks: Vec::new(),
            pending_start: None,
            clock: SessionClock::new(),
            cancel: cancel.clone(),
        };
        let join = tokio::spawn(session.run());

        let handle = SessionHandle {
            inbox: inbox_tx,
            streams,
            cancel,
        };
        (handle, join)
    }

    async fn run(mut self) {
        log::info!("Navigationssitzung gestartet");

        if let Some(params) = self.collaborators.map.current_camera() {
            let _ = self.dispatch(NavIntent::RendererCameraReported { params });
        }

        let mut heartbeat = tokio::time::interval(Duration::from_millis(
            self.state.options.tracker.heartbeat_interval_ms.max(1),
        ));
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut camera_tick = tokio::time::interval(Duration::from_millis(
            self.state.options.camera.tick_interval_ms.max(1),
        ));
        camera_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                message = self.inbox.recv() => {
                    let Some(message) = message else { break };
                    self.handle_message(message);
                }

                Some(result) = self.route_rx.recv() => self.handle_route_result(result),

                item = recv_optional(&mut self.positions), if self.positions.is_some() => {
                    match item {
                        Some(Ok(position)) => {
                            self.clock.observe(position.timestamp_ms);
                            let _ = self.dispatch(NavIntent::PositionReceived { position });
                        }
                        Some(Err(error)) => {
                            let _ = self.dispatch(NavIntent::LocationFailed { error });
                        }
                        None => {
                            log::info!("Positionsquelle beendet");
                            self.positions = None;
                        }
                    }
                }

                _ = heartbeat.tick() => {
                    let _ = self.dispatch(NavIntent::HeartbeatTick { now_ms: self.clock.now_ms() });
                }

                _ = camera_tick.tick() => {
                    let _ = self.dispatch(NavIntent::CameraTick { now_ms: self.clock.now_ms() });
                }
            }

            self.flush_effects();
            self.resolve_pending_start();
        }

        self.abort_routing();
        if let Some((_, reply)) = self.pending_start.take() {
            let _ = reply.send(Err(session_closed()));
        }
        log::info!("Navigationssitzung beendet");
    }

    fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Start { request, reply } => {
                match self.dispatch(NavIntent::StartRequested { request }) {
                    Ok(()) => self.pending_start = Some((self.state.route_generation, reply)),
                    Err(error) => {
                        let _ = reply.send(Err(error));
                    }
                }
            }
            SessionMessage::Pause { reply } => {
                let _ = reply.send(self.dispatch(NavIntent::PauseRequested));
            }
            SessionMessage::Resume { reply } => {
                let now_ms = self.clock.now_ms();
                let _ = reply.send(self.dispatch(NavIntent::ResumeRequested { now_ms }));
            }
            SessionMessage::Stop { reply } => {
                let _ = reply.send(self.dispatch(NavIntent::StopRequested));
            }
            SessionMessage::SetVoice { enabled, reply } => {
                let _ = reply.send(self.dispatch(NavIntent::VoiceToggled { enabled }));
            }
            SessionMessage::SetProfile { profile, reply } => {
                let _ = reply.send(self.dispatch(NavIntent::RouteProfileChanged { profile }));
            }
        }
    }

    fn handle_route_result(&mut self, result: RouteResult) {
        let intent = match result {
            RouteResult::Initial { generation, result } => NavIntent::RouteCalculated {
                generation,
                result,
                now_ms: self.clock.now_ms(),
            },
            RouteResult::Reroute { generation, result } => {
                NavIntent::RerouteCompleted { generation, result }
            }
        };
        let _ = self.dispatch(intent);
    }

    fn dispatch(&mut self, intent: NavIntent) -> Result<(), NavError> {
        let result = self.controller.handle_intent(&mut self.state, intent);
        if let Err(error) = &result {
            log::warn!("Intent abgelehnt: {error}");
        }
        result
    }

    fn flush_effects(&mut self) {
        for effect in self.state.take_effects() {
            if self.collaborators.dispatch(&effect) {
                continue;
            }
            match effect {
                NavEffect::RequestRoute {
                    generation,
                    request,
                } => {
                    let future = self.provider.get_route(request);
                    let tx = self.route_tx.clone();
                    self.spawn_routing(async move {
                        let result = future.await;
                        let _ = tx.send(RouteResult::Initial { generation, result });
                    });
                }
                NavEffect::RequestReroute {
                    generation,
                    request,
                } => {
                    let future = self.provider.reroute(request);
                    let tx = self.route_tx.clone();
                    self.spawn_routing(async move {
                        let result = future.await;
                        let _ = tx.send(RouteResult::Reroute { generation, result });
                    });
                }
                NavEffect::CancelRouting => self.abort_routing(),
                other => log::error!("Effekt ohne Empfänger: {other:?}"),
            }
        }
    }

    fn spawn_routing(&mut self, task: impl Future<Output = ()> + Send + 'static) {
        self.routing_tasks.retain(|handle| !handle.is_finished());
        self.routing_tasks.push(tokio::spawn(task));
    }

    fn abort_routing(&mut self) {
        for handle in self.routing_tasks.drain(..) {
            handle.abort();
        }
    }

    /// Beantwortet einen wartenden Start, sobald die Berechnung entschieden ist.
    fn resolve_pending_start(&mut self) {
        let Some((generation, _)) = &self.pending_start else {
            return;
        };
        if *generation == self.state.route_generation
            && matches!(self.state.nav, NavigationState::Calculating)
        {
            return;
        }
        let Some((_, reply)) = self.pending_start.take() else {
            return;
        };

        let result = match &self.state.nav {
            NavigationState::Navigating { .. }
            | NavigationState::Paused { .. }
            | NavigationState::Arrived { .. } => Ok(()),
            NavigationState::Error { message } => Err(self
                .state
                .streams
                .subscribe_error()
                .borrow()
                .clone()
                .unwrap_or_else(|| NavError::Internal(message.clone()))),
            NavigationState::Idle | NavigationState::Calculating => Err(NavError::StateViolation(
                "Navigation vor Abschluss der Routenberechnung beendet".into(),
            )),
        };
        let _ = reply.send(result);
    }
}

async fn recv_optional<T>(rx: &mut Option<mpsc::Receiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
