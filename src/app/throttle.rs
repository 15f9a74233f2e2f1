//! Drosselung von Broadcasts nach Zeit und zurückgelegter Strecke.

use crate::shared::geo::{haversine_distance, Coordinate};

/// Lässt ein Update nur durch, wenn seit dem letzten durchgelassenen
/// mindestens `min_interval_ms` vergangen UND `min_distance_m` zurückgelegt
/// wurden. Das erste Update passiert immer.
#[derive(Debug, Clone)]
pub struct BroadcastGate {
    min_interval_ms: u64,
    min_distance_m: f64,
    last: Option<(u64, Coordinate)>,
}

impl BroadcastGate {
    /// Erstellt ein Gate mit Zeit- und Distanzschwelle
    pub fn new(min_interval_ms: u64, min_distance_m: f64) -> Self {
        Self {
            min_interval_ms,
            min_distance_m,
            last: None,
        }
    }

    /// Prüft und merkt sich das Update, falls es durchgelassen wird.
    pub fn should_emit(&mut self, now_ms: u64, at: Coordinate) -> bool {
        let pass = self.last.is_none_or(|(last_ms, last_at)| {
            now_ms.saturating_sub(last_ms) >= self.min_interval_ms
                && haversine_distance(last_at, at) >= self.min_distance_m
        });
        if pass {
            self.last = Some((now_ms, at));
        }
        pass
    }

    /// Nächstes Update passiert wieder ungefiltert
    pub fn reset(&mut self) {
        self.last = None;
    }
}
