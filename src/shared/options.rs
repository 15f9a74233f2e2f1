//! Zentrale Konfiguration für den Navigationskern.
//!
//! `NavigationOptions` enthält alle zur Laufzeit änderbaren Schwellwerte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

use super::profile::RouteProfile;

// ── Tracker ─────────────────────────────────────────────────────────

/// Toleranz (Meter), innerhalb derer eine Position als "auf der Route" gilt.
pub const ON_ROUTE_TOLERANCE_M: f64 = 15.0;
/// Abweichungsschwelle (Meter) für Deviation-Events.
pub const DEVIATION_THRESHOLD_M: f64 = 30.0;
/// Sperrzeit für erneute Ansage desselben Manövers.
pub const REANNOUNCE_SUPPRESS_MS: u64 = 30_000;
/// Verkürzte Sperrzeit für dringende Wiederholungen.
pub const URGENT_REANNOUNCE_MS: u64 = 10_000;
/// Distanz (Meter), ab der eine Wiederholung als dringend gilt.
pub const URGENT_DISTANCE_M: f64 = 50.0;
/// Positionssprung (Meter), ab dem Fortschritt erneut gesendet wird.
pub const PROGRESS_EMIT_DISTANCE_M: f64 = 10.0;
/// Änderung des Fortschrittsanteils für den Event-Pfad (1 %).
pub const PROGRESS_EMIT_RATIO: f64 = 0.01;
/// Änderung des Fortschrittsanteils für den Heartbeat-Pfad (0,5 %).
pub const HEARTBEAT_EMIT_RATIO: f64 = 0.005;
/// Heartbeat-Intervall.
pub const HEARTBEAT_INTERVAL_MS: u64 = 2_000;

// ── Off-Route ───────────────────────────────────────────────────────

/// Aufeinanderfolgende Off-Route-Meldungen bis zur Neuberechnung.
pub const OFF_ROUTE_CONSECUTIVE_THRESHOLD: u32 = 3;
/// Cooldown zwischen zwei Neuberechnungen.
pub const REROUTE_COOLDOWN_MS: u64 = 5_000;
/// Maximal plausible Geschwindigkeit (m/s) zwischen zwei Fixes.
pub const MAX_PLAUSIBLE_SPEED_MPS: f64 = 500.0;
/// Mindestabstand (Meter) für einen verdächtigen Sprung auf (0,0).
pub const NULL_ISLAND_JUMP_M: f64 = 100_000.0;

// ── Broadcast ───────────────────────────────────────────────────────

/// Mindestabstand zwischen zwei Navigationszustands-Broadcasts.
pub const STATE_BROADCAST_INTERVAL_MS: u64 = 500;
/// Mindestbewegung zwischen zwei Navigationszustands-Broadcasts.
pub const STATE_BROADCAST_DISTANCE_M: f64 = 2.0;
/// Mindestabstand zwischen zwei Routen-Visualisierungen.
pub const VISUAL_BROADCAST_INTERVAL_MS: u64 = 100;
/// Mindestbewegung zwischen zwei Routen-Visualisierungen.
pub const VISUAL_BROADCAST_DISTANCE_M: f64 = 1.0;

// ── Kamera ──────────────────────────────────────────────────────────

/// Minimaler Zoom (hohe Geschwindigkeit).
pub const CAMERA_ZOOM_MIN: f64 = 15.0;
/// Maximaler Zoom (Stillstand).
pub const CAMERA_ZOOM_MAX: f64 = 18.5;
/// Minimaler Pitch in Grad (Stillstand).
pub const CAMERA_PITCH_MIN: f64 = 30.0;
/// Maximaler Pitch in Grad (hohe Geschwindigkeit).
pub const CAMERA_PITCH_MAX: f64 = 60.0;
/// Untere Geschwindigkeitsschwelle (m/s).
pub const CAMERA_LOW_SPEED_MPS: f64 = 5.0;
/// Obere Geschwindigkeitsschwelle (m/s).
pub const CAMERA_HIGH_SPEED_MPS: f64 = 25.0;
/// Radius (Meter), in dem ein kommendes Manöver die Kamera beeinflusst.
pub const CAMERA_MANEUVER_RADIUS_M: f64 = 500.0;
/// Kamera-Tick-Intervall für Animationen.
pub const CAMERA_TICK_INTERVAL_MS: u64 = 100;

/// Schwellwerte des Fortschritts-Trackers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerOptions {
    /// Toleranz für das On-Route-Flag in Metern
    pub on_route_tolerance_m: f64,
    /// Abweichung in Metern, ab der ein Deviation-Event ausgelöst wird
    pub deviation_threshold_m: f64,
    /// Sperrzeit für Wiederholungsansagen
    pub reannounce_suppress_ms: u64,
    /// Sperrzeit für dringende Wiederholungen
    pub urgent_reannounce_ms: u64,
    /// Distanzgrenze für dringende Wiederholungen
    pub urgent_distance_m: f64,
    /// Bewegung, ab der Fortschritt erneut gesendet wird
    pub progress_emit_distance_m: f64,
    /// Anteilsänderung für den Event-Pfad
    pub progress_emit_ratio: f64,
    /// Anteilsänderung für den Heartbeat-Pfad
    pub heartbeat_emit_ratio: f64,
    /// Heartbeat-Intervall
    pub heartbeat_interval_ms: u64,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            on_route_tolerance_m: ON_ROUTE_TOLERANCE_M,
            deviation_threshold_m: DEVIATION_THRESHOLD_M,
            reannounce_suppress_ms: REANNOUNCE_SUPPRESS_MS,
            urgent_reannounce_ms: URGENT_REANNOUNCE_MS,
            urgent_distance_m: URGENT_DISTANCE_M,
            progress_emit_distance_m: PROGRESS_EMIT_DISTANCE_M,
            progress_emit_ratio: PROGRESS_EMIT_RATIO,
            heartbeat_emit_ratio: HEARTBEAT_EMIT_RATIO,
            heartbeat_interval_ms: HEARTBEAT_INTERVAL_MS,
        }
    }
}

/// Geschichtete Ankunftserkennung.
///
/// Die Reihenfolge der Prüfungen ist fest (Off-Route → Restdistanz →
/// Luftlinie → Entscheidung), die Werte sind empirisch und tunebar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArrivalPolicy {
    /// Ab dieser Routenabweichung wird gar nicht geprüft
    pub max_off_route_m: f64,
    /// Restdistanz-Gate
    pub remaining_gate_m: f64,
    /// Luftlinien-Gate
    pub direct_gate_m: f64,
    /// Regulärer Trigger: Restdistanz
    pub trigger_remaining_m: f64,
    /// Regulärer Trigger: Luftlinie
    pub trigger_direct_m: f64,
    /// Stillstands-Trigger: Geschwindigkeit (m/s)
    pub slow_speed_mps: f64,
    /// Stillstands-Trigger: Luftlinie
    pub slow_direct_m: f64,
    /// Erster Fix / kein Zeitdelta: Restdistanz
    pub first_fix_remaining_m: f64,
    /// Erster Fix / kein Zeitdelta: Luftlinie
    pub first_fix_direct_m: f64,
    /// Stillstands- und Erstfix-Trigger nur bis zu dieser Routenabweichung
    pub trigger_off_route_m: f64,
}

impl Default for ArrivalPolicy {
    fn default() -> Self {
        Self {
            max_off_route_m: 25.0,
            remaining_gate_m: 15.0,
            direct_gate_m: 30.0,
            trigger_remaining_m: 8.0,
            trigger_direct_m: 15.0,
            slow_speed_mps: 2.0,
            slow_direct_m: 20.0,
            first_fix_remaining_m: 12.0,
            first_fix_direct_m: 18.0,
            trigger_off_route_m: ON_ROUTE_TOLERANCE_M,
        }
    }
}

/// Neuberechnungs-Politik bei Routenabweichung.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OffRouteOptions {
    /// Aufeinanderfolgende Abweichungen bis zur Neuberechnung
    pub consecutive_threshold: u32,
    /// Cooldown zwischen zwei Neuberechnungen
    pub cooldown_ms: u64,
    /// Maximal plausible Geschwindigkeit zwischen zwei Fixes
    pub max_plausible_speed_mps: f64,
    /// Mindestabstand für einen verdächtigen Sprung auf (0,0)
    pub null_island_jump_m: f64,
}

impl Default for OffRouteOptions {
    fn default() -> Self {
        Self {
            consecutive_threshold: OFF_ROUTE_CONSECUTIVE_THRESHOLD,
            cooldown_ms: REROUTE_COOLDOWN_MS,
            max_plausible_speed_mps: MAX_PLAUSIBLE_SPEED_MPS,
            null_island_jump_m: NULL_ISLAND_JUMP_M,
        }
    }
}

/// Rate-Limits für Broadcasts an externe Listener.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BroadcastOptions {
    /// Mindestabstand Navigationszustand
    pub state_interval_ms: u64,
    /// Mindestbewegung Navigationszustand
    pub state_distance_m: f64,
    /// Mindestabstand Routen-Visualisierung
    pub visual_interval_ms: u64,
    /// Mindestbewegung Routen-Visualisierung
    pub visual_distance_m: f64,
}

impl Default for BroadcastOptions {
    fn default() -> Self {
        Self {
            state_interval_ms: STATE_BROADCAST_INTERVAL_MS,
            state_distance_m: STATE_BROADCAST_DISTANCE_M,
            visual_interval_ms: VISUAL_BROADCAST_INTERVAL_MS,
            visual_distance_m: VISUAL_BROADCAST_DISTANCE_M,
        }
    }
}

/// Parameter der Kameradynamik.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraOptions {
    /// Minimaler Zoom
    pub zoom_min: f64,
    /// Maximaler Zoom
    pub zoom_max: f64,
    /// Minimaler Pitch (Grad)
    pub pitch_min: f64,
    /// Maximaler Pitch (Grad)
    pub pitch_max: f64,
    /// Untere Geschwindigkeitsschwelle
    pub low_speed_mps: f64,
    /// Obere Geschwindigkeitsschwelle
    pub high_speed_mps: f64,
    /// Einflussradius kommender Manöver
    pub maneuver_radius_m: f64,
    /// Kamera-Tick-Intervall
    pub tick_interval_ms: u64,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            zoom_min: CAMERA_ZOOM_MIN,
            zoom_max: CAMERA_ZOOM_MAX,
            pitch_min: CAMERA_PITCH_MIN,
            pitch_max: CAMERA_PITCH_MAX,
            low_speed_mps: CAMERA_LOW_SPEED_MPS,
            high_speed_mps: CAMERA_HIGH_SPEED_MPS,
            maneuver_radius_m: CAMERA_MANEUVER_RADIUS_M,
            tick_interval_ms: CAMERA_TICK_INTERVAL_MS,
        }
    }
}

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Navigations-Optionen.
/// Wird als `turn_guidance.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NavigationOptions {
    /// Bevorzugtes Routenprofil (verkehrsabhängig oder nicht)
    #[serde(default)]
    pub route_profile: RouteProfile,
    /// Sprachansagen aktiv
    #[serde(default = "default_voice_enabled")]
    pub voice_enabled: bool,
    /// Tracker-Schwellwerte
    #[serde(default)]
    pub tracker: TrackerOptions,
    /// Ankunftserkennung
    #[serde(default)]
    pub arrival: ArrivalPolicy,
    /// Off-Route-Politik und Positionsfilter
    #[serde(default)]
    pub off_route: OffRouteOptions,
    /// Broadcast-Rate-Limits
    #[serde(default)]
    pub broadcast: BroadcastOptions,
    /// Kameradynamik
    #[serde(default)]
    pub camera: CameraOptions,
}

/// Serde-Default für `voice_enabled` (Abwärtskompatibilität).
fn default_voice_enabled() -> bool {
    true
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            route_profile: RouteProfile::default(),
            voice_enabled: true,
            tracker: TrackerOptions::default(),
            arrival: ArrivalPolicy::default(),
            off_route: OffRouteOptions::default(),
            broadcast: BroadcastOptions::default(),
            camera: CameraOptions::default(),
        }
    }
}

impl NavigationOptions {
    /// Standard-Optionen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::new()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::new()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("turn_guidance"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("turn_guidance.toml")
    }
}
