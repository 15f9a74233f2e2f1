//! Manöver-Typen und deren Klassifizierung.

use serde::{Deserialize, Serialize};

use crate::shared::geo::Coordinate;

/// Art des Manövers am Beginn eines Steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverKind {
    /// Abfahrt am Start eines Legs
    Depart,
    /// Abbiegen
    Turn,
    /// Straßenname wechselt, keine Richtungsänderung
    NewName,
    /// Weiterfahren
    Continue,
    /// Einfädeln
    Merge,
    /// Auffahrt
    OnRamp,
    /// Abfahrt (Ausfahrt)
    OffRamp,
    /// Gabelung
    Fork,
    /// Straßenende, Abbiegen erzwungen
    EndOfRoad,
    /// Einfahrt in Kreisverkehr
    Roundabout,
    /// Ausfahrt aus Kreisverkehr
    RoundaboutExit,
    /// Großer Kreisverkehr
    Rotary,
    /// Reiner Hinweis ohne Fahrmanöver
    Notification,
    /// Ankunft am Ziel eines Legs
    Arrive,
}

/// Richtungs-Modifikator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverModifier {
    /// Wenden
    UTurn,
    /// Scharf rechts
    SharpRight,
    /// Rechts
    Right,
    /// Leicht rechts
    SlightRight,
    /// Geradeaus
    Straight,
    /// Leicht links
    SlightLeft,
    /// Links
    Left,
    /// Scharf links
    SharpLeft,
}

impl ManeuverModifier {
    /// Textbaustein für Ansagen
    pub fn phrase(self) -> &'static str {
        match self {
            ManeuverModifier::UTurn => "make a U-turn",
            ManeuverModifier::SharpRight => "turn sharp right",
            ManeuverModifier::Right => "turn right",
            ManeuverModifier::SlightRight => "keep slightly right",
            ManeuverModifier::Straight => "continue straight",
            ManeuverModifier::SlightLeft => "keep slightly left",
            ManeuverModifier::Left => "turn left",
            ManeuverModifier::SharpLeft => "turn sharp left",
        }
    }

    /// Scharfe Kurve oder Wenden
    pub fn is_sharp(self) -> bool {
        matches!(
            self,
            ManeuverModifier::UTurn | ManeuverModifier::SharpLeft | ManeuverModifier::SharpRight
        )
    }
}

/// Manöver am Beginn eines Steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    /// Art des Manövers
    pub kind: ManeuverKind,
    /// Optionaler Richtungs-Modifikator
    #[serde(default)]
    pub modifier: Option<ManeuverModifier>,
    /// Anweisungstext des Routing-Providers
    #[serde(default)]
    pub instruction: String,
    /// Ort des Manövers
    pub location: Coordinate,
    /// Peilung nach dem Manöver (Grad)
    #[serde(default)]
    pub bearing_after: Option<f64>,
    /// Index des Legs (wird beim Aufbau der Route gesetzt)
    #[serde(default)]
    pub leg_index: usize,
    /// Index des Steps im Leg (wird beim Aufbau der Route gesetzt)
    #[serde(default)]
    pub step_index: usize,
}

impl Maneuver {
    /// Erstellt ein Manöver ohne Modifikator
    pub fn new(kind: ManeuverKind, location: Coordinate) -> Self {
        Self {
            kind,
            modifier: None,
            instruction: String::new(),
            location,
            bearing_after: None,
            leg_index: 0,
            step_index: 0,
        }
    }

    /// Setzt den Richtungs-Modifikator
    pub fn with_modifier(mut self, modifier: ManeuverModifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Setzt den Anweisungstext
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Kreisverkehr (inkl. Rotary)
    pub fn is_roundabout(&self) -> bool {
        matches!(
            self.kind,
            ManeuverKind::Roundabout | ManeuverKind::Rotary | ManeuverKind::RoundaboutExit
        )
    }

    /// Auf-/Abfahrt oder Einfädeln
    pub fn is_ramp_or_merge(&self) -> bool {
        matches!(
            self.kind,
            ManeuverKind::OnRamp | ManeuverKind::OffRamp | ManeuverKind::Merge
        )
    }

    /// Auf- oder Abfahrt
    pub fn is_ramp(&self) -> bool {
        matches!(self.kind, ManeuverKind::OnRamp | ManeuverKind::OffRamp)
    }

    /// Abbiege-artiges Manöver
    pub fn is_turn(&self) -> bool {
        matches!(
            self.kind,
            ManeuverKind::Turn | ManeuverKind::EndOfRoad | ManeuverKind::Continue
        ) && self.modifier.is_some_and(|m| m != ManeuverModifier::Straight)
    }

    /// Ankunft
    pub fn is_arrival(&self) -> bool {
        self.kind == ManeuverKind::Arrive
    }

    /// Komplexe Manöver bekommen größere Ansage-Fenster und eine
    /// zurückhaltendere Kamera.
    pub fn is_complex(&self) -> bool {
        self.is_roundabout()
            || self.is_ramp()
            || self.kind == ManeuverKind::Fork
            || self.modifier.is_some_and(ManeuverModifier::is_sharp)
    }

    /// Multiplikator für die Ansage-Schwellen
    pub fn complexity_multiplier(&self) -> f64 {
        if self.is_roundabout() || self.modifier == Some(ManeuverModifier::UTurn) {
            1.5
        } else if self.is_complex() {
            1.3
        } else {
            1.0
        }
    }

    /// Kurztext für Ansagen, falls der Provider keinen Text liefert
    pub fn fallback_phrase(&self) -> String {
        match self.kind {
            ManeuverKind::Depart => "depart".to_string(),
            ManeuverKind::Arrive => "arrive at your destination".to_string(),
            ManeuverKind::Roundabout | ManeuverKind::Rotary => "enter the roundabout".to_string(),
            ManeuverKind::RoundaboutExit => "exit the roundabout".to_string(),
            ManeuverKind::Merge => "merge".to_string(),
            ManeuverKind::OnRamp => "take the ramp".to_string(),
            ManeuverKind::OffRamp => "take the exit".to_string(),
            ManeuverKind::Fork => match self.modifier {
                Some(ManeuverModifier::Left | ManeuverModifier::SlightLeft) => {
                    "keep left at the fork".to_string()
                }
                Some(ManeuverModifier::Right | ManeuverModifier::SlightRight) => {
                    "keep right at the fork".to_string()
                }
                _ => "continue at the fork".to_string(),
            },
            _ => self
                .modifier
                .map(|m| m.phrase().to_string())
                .unwrap_or_else(|| "continue".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(kind: ManeuverKind, modifier: Option<ManeuverModifier>) -> Maneuver {
        Maneuver {
            modifier,
            ..Maneuver::new(kind, Coordinate::new(0.0, 0.0))
        }
    }

    #[test]
    fn complexity_classification() {
        assert!(m(ManeuverKind::Roundabout, None).is_complex());
        assert!(m(ManeuverKind::Fork, Some(ManeuverModifier::SlightLeft)).is_complex());
        assert!(m(ManeuverKind::OffRamp, None).is_complex());
        assert!(m(ManeuverKind::Turn, Some(ManeuverModifier::SharpLeft)).is_complex());
        assert!(!m(ManeuverKind::Turn, Some(ManeuverModifier::Left)).is_complex());
        assert!(!m(ManeuverKind::Merge, None).is_complex());
    }

    #[test]
    fn multiplier_is_largest_for_roundabouts_and_u_turns() {
        assert_eq!(m(ManeuverKind::Rotary, None).complexity_multiplier(), 1.5);
        assert_eq!(
            m(ManeuverKind::Turn, Some(ManeuverModifier::UTurn)).complexity_multiplier(),
            1.5
        );
        assert_eq!(m(ManeuverKind::Fork, None).complexity_multiplier(), 1.3);
        assert_eq!(
            m(ManeuverKind::Turn, Some(ManeuverModifier::Right)).complexity_multiplier(),
            1.0
        );
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ManeuverKind::OffRamp).unwrap();
        assert_eq!(json, "\"off_ramp\"");
        let back: ManeuverModifier = serde_json::from_str("\"sharp_left\"").unwrap();
        assert_eq!(back, ManeuverModifier::SharpLeft);
    }
}
