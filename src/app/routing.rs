//! Vertrag zum Routing-Provider: Anfragen, Neuberechnung, Ergebnis-Futures.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{Position, RouteModel};
use crate::error::NavError;
use crate::shared::geo::Coordinate;

pub use crate::shared::profile::{ProviderParams, RouteProfile};

/// Optionen einer Routenanfrage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    /// Gewünschtes Profil
    pub profile: RouteProfile,
    /// Alternativrouten anfordern
    pub alternatives: bool,
}

/// Erstanfrage einer Route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Start
    pub origin: Coordinate,
    /// Ziel
    pub destination: Coordinate,
    /// Zwischenziele in Reihenfolge
    pub waypoints: Vec<Coordinate>,
    /// Optionen
    pub options: RouteOptions,
}

impl RouteRequest {
    /// Prüft alle Koordinaten der Anfrage
    pub fn validate(&self) -> Result<(), NavError> {
        let all = std::iter::once(&self.origin)
            .chain(self.waypoints.iter())
            .chain(std::iter::once(&self.destination));
        for (i, c) in all.enumerate() {
            if !c.is_valid() {
                return Err(NavError::InvalidInput(format!(
                    "Koordinate {i} ungueltig: ({}, {})",
                    c.lat, c.lon
                )));
            }
        }
        Ok(())
    }
}

/// Neuberechnung ab der aktuellen Position
#[derive(Debug, Clone)]
pub struct RerouteRequest {
    /// Aktuelle Position des Fahrers
    pub position: Position,
    /// Bisherige Route
    pub previous: Arc<RouteModel>,
    /// Leg, in dem der Fahrer zuletzt auf der Route war
    pub leg_index: usize,
    /// Profil des Fahrers
    pub profile: RouteProfile,
}

impl RerouteRequest {
    /// Noch nicht erreichte Zwischenziele samt Ziel.
    pub fn remaining_waypoints(&self) -> Vec<Coordinate> {
        self.previous
            .waypoints()
            .into_iter()
            .skip(self.leg_index)
            .collect()
    }
}

/// Boxed Future eines Routing-Ergebnisses
pub type RouteFuture = Pin<Box<dyn Future<Output = Result<RouteModel, NavError>> + Send>>;

/// Externer Routing-Provider (z.B. Directions-API)
pub trait RoutingProvider: Send + Sync {
    /// Berechnet eine neue Route
    fn get_route(&self, request: RouteRequest) -> RouteFuture;

    /// Berechnet eine Route ab der aktuellen Position neu
    fn reroute(&self, request: RerouteRequest) -> RouteFuture;
}
