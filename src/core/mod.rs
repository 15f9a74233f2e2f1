//! Core-Domänentypen: Position, Route, Manöver, Fortschritt, Kamera, Spatial-Index.

pub mod camera;
pub mod instruction;
pub mod lookahead;
pub mod maneuver;
pub mod position;
pub mod progress;
/// Routenmodell mit Cursor-Abfragen
///
/// - RouteModel: validierte, unveränderliche Route aus Legs und Steps
/// - RouteSnap: Projektion einer Koordinate auf die Route
pub mod route;
pub mod spatial;

pub use camera::{
    AnimationKind, CameraAnimator, CameraDynamics, CameraParameters, HeadingSmoother,
    ManeuverContext,
};
pub use instruction::{format_distance, format_instruction};
pub use lookahead::{AnnounceThresholds, AnnouncementUrgency, LookAhead};
pub use maneuver::{Maneuver, ManeuverKind, ManeuverModifier};
pub use position::Position;
pub use progress::{RouteProgress, UpcomingManeuver};
pub use route::{Leg, RouteModel, RouteSnap, Step};
pub use spatial::RouteIndex;
