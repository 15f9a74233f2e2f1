//! Drosselung von Neuberechnungen bei Routenabweichung.

use super::routing::RouteProfile;
use super::tracker::RouteDeviation;
use crate::core::Position;
use crate::shared::OffRouteOptions;

/// Grund für eine unterdrückte Neuberechnung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Letzte Neuberechnung liegt innerhalb der Abklingzeit
    Cooldown,
    /// Eine Neuberechnung läuft bereits
    InFlight,
}

/// Entscheidung der Policy für ein Abweichungs-Signal
#[derive(Debug, Clone, PartialEq)]
pub enum RerouteDecision {
    /// Nur Visualisierung, keine Anfrage
    Suppressed(SuppressReason),
    /// Abweichung gezählt, Schwelle noch nicht erreicht
    Counting(u32),
    /// Neuberechnung anfordern
    Reroute {
        /// Position für die Anfrage
        from: Position,
        /// Profil des Fahrers
        profile: RouteProfile,
    },
}

/// Hysterese und Abklingzeit für Neuberechnungen.
#[derive(Debug, Clone)]
pub struct OffRoutePolicy {
    options: OffRouteOptions,
    profile: RouteProfile,
    last_reroute_ms: Option<u64>,
    last_known_good: Option<Position>,
    consecutive: u32,
    in_flight: bool,
}

impl OffRoutePolicy {
    /// Erstellt die Policy
    pub fn new(options: OffRouteOptions, profile: RouteProfile) -> Self {
        Self {
            options,
            profile,
            last_reroute_ms: None,
            last_known_good: None,
            consecutive: 0,
            in_flight: false,
        }
    }

    /// Setzt das Routenprofil für künftige Anfragen
    pub fn set_profile(&mut self, profile: RouteProfile) {
        self.profile = profile;
    }

    /// Aktuelles Routenprofil
    pub fn profile(&self) -> RouteProfile {
        self.profile
    }

    /// Zähler aufeinanderfolgender Abweichungen
    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    /// Letzte auf der Route bestätigte Position
    pub fn last_known_good(&self) -> Option<&Position> {
        self.last_known_good.as_ref()
    }

    /// Zeitpunkt der letzten autorisierten Neuberechnung
    pub fn last_reroute_ms(&self) -> Option<u64> {
        self.last_reroute_ms
    }

    /// Läuft eine Neuberechnung?
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Verarbeitet ein Abweichungs-Signal.
    pub fn on_deviation(&mut self, deviation: &RouteDeviation) -> RerouteDecision {
        if self.in_flight {
            return RerouteDecision::Suppressed(SuppressReason::InFlight);
        }
        if let Some(last) = self.last_reroute_ms {
            if deviation.timestamp_ms.saturating_sub(last) < self.options.cooldown_ms {
                log::debug!(
                    "Neuberechnung unterdrückt (Abklingzeit, {:.0} m neben der Route)",
                    deviation.distance_from_route
                );
                return RerouteDecision::Suppressed(SuppressReason::Cooldown);
            }
        }

        self.consecutive += 1;
        if self.consecutive < self.options.consecutive_threshold.max(1) {
            return RerouteDecision::Counting(self.consecutive);
        }

        self.consecutive = 0;
        self.last_reroute_ms = Some(deviation.timestamp_ms);
        self.in_flight = true;
        log::info!(
            "Neuberechnung autorisiert ({:.0} m neben der Route, Profil {:?})",
            deviation.distance_from_route,
            self.profile
        );
        RerouteDecision::Reroute {
            from: deviation.position,
            profile: self.profile,
        }
    }

    /// Position liegt auf der Route: Zähler zurücksetzen.
    pub fn on_route(&mut self, position: &Position) {
        self.consecutive = 0;
        self.last_known_good = Some(*position);
    }

    /// Meldet das Ende einer Neuberechnung (Erfolg oder Fehler).
    pub fn reroute_finished(&mut self) {
        self.in_flight = false;
    }

    /// Alles zurücksetzen (Sitzungsende)
    pub fn reset(&mut self) {
        self.last_reroute_ms = None;
        self.last_known_good = None;
        self.consecutive = 0;
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deviation(ts: u64) -> RouteDeviation {
        RouteDeviation {
            position: Position::new(37.0, -122.0, ts),
            distance_from_route: 45.0,
            timestamp_ms: ts,
        }
    }

    fn policy() -> OffRoutePolicy {
        OffRoutePolicy::new(OffRouteOptions::default(), RouteProfile::FastestTraffic)
    }

    #[test]
    fn third_consecutive_deviation_triggers_reroute() {
        let mut p = policy();
        assert_eq!(p.on_deviation(&deviation(0)), RerouteDecision::Counting(1));
        assert_eq!(p.on_deviation(&deviation(1000)), RerouteDecision::Counting(2));
        let decision = p.on_deviation(&deviation(2000));
        assert!(matches!(
            decision,
            RerouteDecision::Reroute {
                profile: RouteProfile::FastestTraffic,
                ..
            }
        ));
        assert_eq!(p.consecutive(), 0);
        assert_eq!(p.last_reroute_ms(), Some(2000));
    }

    #[test]
    fn on_route_resets_counter() {
        let mut p = policy();
        p.on_deviation(&deviation(0));
        p.on_deviation(&deviation(1000));
        p.on_route(&Position::new(37.0, -122.0, 1500));
        assert_eq!(p.consecutive(), 0);
        assert!(p.last_known_good().is_some());
        assert_eq!(p.on_deviation(&deviation(2000)), RerouteDecision::Counting(1));
    }

    #[test]
    fn in_flight_and_cooldown_suppress() {
        let mut p = policy();
        for ts in [0, 100, 200] {
            p.on_deviation(&deviation(ts));
        }
        assert_eq!(
            p.on_deviation(&deviation(300)),
            RerouteDecision::Suppressed(SuppressReason::InFlight)
        );
        p.reroute_finished();
        assert_eq!(
            p.on_deviation(&deviation(4_000)),
            RerouteDecision::Suppressed(SuppressReason::Cooldown)
        );
        assert_eq!(p.on_deviation(&deviation(5_200)), RerouteDecision::Counting(1));
    }

    #[test]
    fn never_two_reroutes_within_cooldown() {
        let mut p = policy();
        let mut reroutes = Vec::new();
        for i in 0..200u64 {
            let ts = i * 50;
            if let RerouteDecision::Reroute { .. } = p.on_deviation(&deviation(ts)) {
                reroutes.push(ts);
                p.reroute_finished();
            }
        }
        assert!(reroutes.len() >= 2);
        for pair in reroutes.windows(2) {
            assert!(pair[1] - pair[0] >= 5_000);
        }
    }
}
