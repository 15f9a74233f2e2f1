//! Application-Layer: Controller, State, Events, Use-Cases und Sitzung.

pub mod broadcast;
pub mod clock;
pub mod collaborators;
pub mod command_log;
pub mod controller;
pub mod events;
mod intent_mapping;
pub mod off_route;
pub mod position_gate;
pub mod routing;
pub mod session;
/// Navigationszustand und Sitzungsdaten
///
/// Dieses Modul hält die Zustandsmaschine und alle per-Sitzung veränderlichen Teile.
pub mod state;
pub mod throttle;
pub mod tracker;
pub mod use_cases;

pub use broadcast::NavigationStreams;
pub use clock::{wall_clock_ms, SessionClock};
pub use collaborators::{
    markers_for, Collaborators, MapMarker, MapRenderer, MarkerKind, VoiceAnnouncer,
};
pub use command_log::CommandLog;
pub use controller::NavigationController;
pub use events::{NavCommand, NavEffect, NavIntent};
pub use off_route::{OffRoutePolicy, RerouteDecision, SuppressReason};
pub use position_gate::{PositionGate, PositionRejection};
pub use routing::{
    ProviderParams, RerouteRequest, RouteFuture, RouteOptions, RouteProfile, RouteRequest,
    RoutingProvider,
};
pub use session::{NavigationSession, SessionHandle};
pub use state::{NavigationState, SessionState};
pub use throttle::BroadcastGate;
pub use tracker::{
    ArrivalEvent, ManeuverAnnouncement, ProgressTracker, RouteDeviation, TrackerOutput,
};
