//! Turn-by-Turn Replay.
//!
//! Fährt eine Route aus einer JSON-Datei mit konstanter Geschwindigkeit ab
//! und protokolliert Zustände, Ansagen, Kamera und Ankunft.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use turn_guidance::app::{wall_clock_ms, RouteFuture};
use turn_guidance::shared::geo::{initial_bearing, point_along, polyline_length};
use turn_guidance::{
    CameraParameters, Collaborators, Coordinate, MapMarker, MapRenderer, NavError,
    NavigationOptions, NavigationSession, NavigationState, Position, RerouteRequest,
    RouteModel, RouteOptions, RouteRequest, RoutingProvider, VoiceAnnouncer,
};

const USAGE: &str =
    "Aufruf: turn-guidance-replay <route.json> [geschwindigkeit_mps] [intervall_ms]";
const DEFAULT_SPEED_MPS: f64 = 15.0;
const DEFAULT_INTERVAL_MS: u64 = 1000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Turn-Guidance Replay v{} startet...", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().collect();
    let route_path = args.get(1).context(USAGE)?;
    let speed_mps: f64 = match args.get(2) {
        Some(s) => s.parse().with_context(|| format!("Ungültige Geschwindigkeit: {s}"))?,
        None => DEFAULT_SPEED_MPS,
    };
    let interval_ms: u64 = match args.get(3) {
        Some(s) => s.parse().with_context(|| format!("Ungültiges Intervall: {s}"))?,
        None => DEFAULT_INTERVAL_MS,
    };

    let config_path = NavigationOptions::config_path();
    let options = NavigationOptions::load_from_file(&config_path);
    if !config_path.exists() {
        if let Err(e) = options.save_to_file(&config_path) {
            log::warn!("Standard-Optionen nicht gespeichert: {e:#}");
        }
    }
    let json = std::fs::read_to_string(route_path)
        .with_context(|| format!("Route nicht lesbar: {route_path}"))?;
    let route = RouteModel::from_json(&json).context("Route ungültig")?;
    log::info!(
        "Route geladen: {:.0} m, {} Legs, {} Steps",
        route.total_distance(),
        route.legs().len(),
        route.step_count()
    );

    let polyline = route.polyline();
    let waypoints = {
        let mut points = route.waypoints();
        points.pop();
        points
    };
    let request = RouteRequest {
        origin: route.origin(),
        destination: route.destination(),
        waypoints,
        options: RouteOptions {
            profile: options.route_profile,
            alternatives: false,
        },
    };

    let (position_tx, position_rx) = mpsc::channel(16);
    let collaborators = Collaborators::new(
        Box::new(LogVoice { enabled: true }),
        Box::new(LogMap),
    );
    let provider = Arc::new(ReplayProvider { route });
    let (handle, join) = NavigationSession::spawn(options, provider, collaborators, position_rx);

    tokio::spawn(log_states(handle.streams().subscribe_state()));
    tokio::spawn(log_camera(handle.streams().subscribe_camera()));

    handle
        .start_navigation(request)
        .await
        .context("Navigation konnte nicht starten")?;

    let mut arrival = handle.streams().subscribe_arrival();
    let step_m = speed_mps * interval_ms as f64 / 1000.0;
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    for (coordinate, heading) in sample_polyline(&polyline, step_m) {
        ticker.tick().await;
        if arrival.borrow_and_update().is_some() {
            break;
        }
        let position = Position::at(coordinate, wall_clock_ms())
            .with_speed(speed_mps)
            .with_heading(heading);
        if position_tx.send(Ok(position)).await.is_err() {
            break;
        }
    }

    if let Some(event) = *arrival.borrow() {
        log::info!(
            "Angekommen: {:.1} m Rest, {:.1} m direkt",
            event.distance_remaining,
            event.distance_to_destination
        );
    } else {
        log::warn!("Ende der Route ohne Ankunftsmeldung");
    }

    handle.shutdown();
    join.await.context("Sitzungs-Task abgebrochen")?;
    Ok(())
}

/// Punkte im Abstand `step_m` entlang der Polyline, jeweils mit Fahrtrichtung.
fn sample_polyline(polyline: &[Coordinate], step_m: f64) -> Vec<(Coordinate, f64)> {
    let total = polyline_length(polyline);
    let step_m = step_m.max(1.0);
    let mut samples = Vec::new();
    let mut heading = 0.0;
    let mut d: f64 = 0.0;
    loop {
        let d_clamped = d.min(total);
        let Some(here) = point_along(polyline, d_clamped) else {
            break;
        };
        if let Some(ahead) = point_along(polyline, (d_clamped + 1.0).min(total)) {
            if ahead != here {
                heading = initial_bearing(here, ahead);
            }
        }
        samples.push((here, heading));
        if d >= total {
            break;
        }
        d += step_m;
    }
    samples
}

async fn log_states(mut rx: watch::Receiver<NavigationState>) {
    let mut last = rx.borrow().name();
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        if let NavigationState::Navigating {
            reroute_error: Some(message),
            ..
        } = &state
        {
            log::warn!("Neuberechnung fehlgeschlagen: {message}");
        }
        if state.name() != last {
            log::info!("Zustand: {}", state.name());
            last = state.name();
        }
    }
}

async fn log_camera(mut rx: watch::Receiver<Option<CameraParameters>>) {
    while rx.changed().await.is_ok() {
        if let Some(p) = *rx.borrow_and_update() {
            log::debug!(
                "Kamera: Zoom {:.2}, Pitch {:.1}°, Peilung {:.1}°",
                p.zoom,
                p.pitch,
                p.bearing
            );
        }
    }
}

/// Liefert immer die geladene Route; Neuberechnungen ebenso.
struct ReplayProvider {
    route: RouteModel,
}

impl RoutingProvider for ReplayProvider {
    fn get_route(&self, _request: RouteRequest) -> RouteFuture {
        let route = self.route.clone();
        Box::pin(async move { Ok(route) })
    }

    fn reroute(&self, request: RerouteRequest) -> RouteFuture {
        log::info!(
            "Neuberechnung ab {:.5}, {:.5} angefordert ({} Ziele offen)",
            request.position.latitude,
            request.position.longitude,
            request.remaining_waypoints().len()
        );
        let route = self.route.clone();
        Box::pin(async move {
            if route.total_distance() <= 0.0 {
                return Err(NavError::Routing("leere Route".into()));
            }
            Ok(route)
        })
    }
}

struct LogVoice {
    enabled: bool,
}

impl VoiceAnnouncer for LogVoice {
    fn announce(&mut self, text: &str) {
        log::info!("Ansage: {text}");
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

struct LogMap;

impl MapRenderer for LogMap {
    fn set_route(&mut self, polyline: &[Coordinate]) {
        log::info!("Karte: Route mit {} Punkten", polyline.len());
    }

    fn clear_route(&mut self) {
        log::info!("Karte: Route entfernt");
    }

    fn set_progress_split(&mut self, traveled: &[Coordinate], remaining: &[Coordinate]) {
        log::debug!(
            "Karte: {} Punkte gefahren, {} verbleibend",
            traveled.len(),
            remaining.len()
        );
    }

    fn set_markers(&mut self, markers: &[MapMarker]) {
        log::debug!("Karte: {} Marker", markers.len());
    }

    fn apply_camera(&mut self, _params: &CameraParameters) {}
}
