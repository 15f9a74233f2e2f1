//! Routenprofile des Fahrers und ihre Abbildung auf Provider-Parameter.

use serde::{Deserialize, Serialize};

/// Routenprofil des Fahrers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteProfile {
    /// Schnellste Route ohne Verkehrsdaten
    Fastest,
    /// Schnellste Route mit Verkehrsdaten
    #[default]
    FastestTraffic,
    /// Kürzeste Route
    Shortest,
    /// Verbrauchsoptimiert
    Eco,
    /// Landschaftlich reizvoll
    Scenic,
    /// Ohne Mautstraßen
    TollFree,
}

/// Provider-spezifische Parameter eines Profils
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderParams {
    /// Profil-Bezeichner des Providers
    pub profile: &'static str,
    /// Verkehrsdaten berücksichtigen
    pub traffic: bool,
    /// Ausgeschlossene Straßenklassen
    pub exclude: &'static [&'static str],
    /// Optimierungsziel
    pub optimize: &'static str,
}

/// Zuordnung Profil → Provider-Parameter
const PROFILE_TABLE: [(RouteProfile, ProviderParams); 6] = [
    (
        RouteProfile::Fastest,
        ProviderParams {
            profile: "driving",
            traffic: false,
            exclude: &[],
            optimize: "time",
        },
    ),
    (
        RouteProfile::FastestTraffic,
        ProviderParams {
            profile: "driving-traffic",
            traffic: true,
            exclude: &[],
            optimize: "time",
        },
    ),
    (
        RouteProfile::Shortest,
        ProviderParams {
            profile: "driving",
            traffic: false,
            exclude: &[],
            optimize: "distance",
        },
    ),
    (
        RouteProfile::Eco,
        ProviderParams {
            profile: "driving-traffic",
            traffic: true,
            exclude: &[],
            optimize: "fuel",
        },
    ),
    (
        RouteProfile::Scenic,
        ProviderParams {
            profile: "driving",
            traffic: false,
            exclude: &["motorway"],
            optimize: "time",
        },
    ),
    (
        RouteProfile::TollFree,
        ProviderParams {
            profile: "driving-traffic",
            traffic: true,
            exclude: &["toll"],
            optimize: "time",
        },
    ),
];

impl RouteProfile {
    /// Alle Profile in Anzeige-Reihenfolge
    pub const ALL: [RouteProfile; 6] = [
        RouteProfile::Fastest,
        RouteProfile::FastestTraffic,
        RouteProfile::Shortest,
        RouteProfile::Eco,
        RouteProfile::Scenic,
        RouteProfile::TollFree,
    ];

    /// Provider-Parameter laut Tabelle
    pub fn params(self) -> ProviderParams {
        PROFILE_TABLE
            .iter()
            .find(|(profile, _)| *profile == self)
            .map(|(_, params)| *params)
            .unwrap_or(PROFILE_TABLE[0].1)
    }

    /// Berücksichtigt das Profil Verkehrsdaten?
    pub fn is_traffic_aware(self) -> bool {
        self.params().traffic
    }
}
