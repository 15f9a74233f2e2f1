//! Anweisungstexte für Ansagen und den Instruction-Stream (nur Englisch).

use super::lookahead::AnnouncementUrgency;
use super::Maneuver;

/// Formatiert eine Distanz für Ansagen ("300 m", "1.2 km").
pub fn format_distance(distance_m: f64) -> String {
    let d = distance_m.max(0.0);
    if d >= 1000.0 {
        let km = (d / 100.0).round() / 10.0;
        if km.fract() == 0.0 {
            format!("{km:.0} km")
        } else {
            format!("{km:.1} km")
        }
    } else if d >= 100.0 {
        format!("{:.0} m", (d / 50.0).round() * 50.0)
    } else {
        format!("{:.0} m", (d / 10.0).round().max(1.0) * 10.0)
    }
}

/// Baut den Anweisungstext für ein Manöver.
///
/// Bevorzugt den Text des Routing-Providers, sonst einen Fallback aus Typ und
/// Modifikator. Unmittelbare Manöver bekommen "Now," statt einer Distanz.
pub fn format_instruction(
    maneuver: &Maneuver,
    distance_m: f64,
    street_name: Option<&str>,
    urgency: AnnouncementUrgency,
) -> String {
    if maneuver.is_arrival() && urgency == AnnouncementUrgency::Immediate {
        return "You have arrived at your destination".to_string();
    }

    let action = if maneuver.instruction.trim().is_empty() {
        let mut phrase = maneuver.fallback_phrase();
        if let Some(name) = street_name.filter(|n| !n.trim().is_empty()) {
            if !maneuver.is_arrival() {
                phrase.push_str(" onto ");
                phrase.push_str(name.trim());
            }
        }
        phrase
    } else {
        lowercase_first(maneuver.instruction.trim())
    };

    match urgency {
        AnnouncementUrgency::Immediate => format!("Now, {action}"),
        _ => format!("In {}, {action}", format_distance(distance_m)),
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
