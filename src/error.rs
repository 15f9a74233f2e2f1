//! Fehler-Taxonomie des Navigationskerns.

use thiserror::Error;

/// Fehler, die an der Aufrufstelle oder im Error-Stream sichtbar werden.
///
/// Alle Varianten tragen nur Strings, damit der Fehler `Clone` bleibt und
/// über Intents und Broadcast-Kanäle weitergereicht werden kann.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    /// Ungültige Eingabe (kaputte Koordinaten, leere Route, …)
    #[error("ungueltige Eingabe: {0}")]
    InvalidInput(String),
    /// Routing-Provider hat einen Fehler geliefert (Netzwerk/API)
    #[error("Routing fehlgeschlagen: {0}")]
    Routing(String),
    /// Positionsquelle ist ausgefallen oder die Berechtigung fehlt
    #[error("Positionsquelle fehlgeschlagen: {0}")]
    Location(#[from] LocationError),
    /// Operation im aktuellen Zustand nicht erlaubt
    #[error("Zustandsverletzung: {0}")]
    StateViolation(String),
    /// Route und Fortschritt passen nicht zusammen
    #[error("interne Inkonsistenz: {0}")]
    Internal(String),
}

impl NavError {
    /// Kurzer, stabiler Name der Fehlerklasse (für Logs und den Error-Stream).
    pub fn kind(&self) -> &'static str {
        match self {
            NavError::InvalidInput(_) => "invalid_input",
            NavError::Routing(_) => "routing",
            NavError::Location(_) => "location",
            NavError::StateViolation(_) => "state_violation",
            NavError::Internal(_) => "internal",
        }
    }
}

/// Fehler der Positionsquelle, getrennt vom normalen Stream-Ende.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// Berechtigung wurde verweigert oder entzogen
    #[error("Standortberechtigung verweigert")]
    PermissionDenied,
    /// Ortungsdienst ist deaktiviert
    #[error("Ortungsdienst deaktiviert")]
    ServiceDisabled,
    /// Sonstiger Ausfall der Quelle
    #[error("Position nicht verfuegbar: {0}")]
    Unavailable(String),
}

impl LocationError {
    /// Vorübergehender Ausfall; die Navigation läuft mit dem letzten Fix weiter.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LocationError::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_error_converts_into_nav_error() {
        let err: NavError = LocationError::PermissionDenied.into();
        assert_eq!(err.kind(), "location");
        assert!(err.to_string().contains("Standortberechtigung"));
    }

    #[test]
    fn only_unavailable_is_recoverable() {
        assert!(LocationError::Unavailable("GPS-Timeout".into()).is_recoverable());
        assert!(!LocationError::PermissionDenied.is_recoverable());
        assert!(!LocationError::ServiceDisabled.is_recoverable());
    }
}
