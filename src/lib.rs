//! Turn-by-Turn Guidance Library.
//! Navigationskern (Route, Fortschritt, Neuberechnung, Kamera) als Library
//! exportiert für Tests, Replay-Tool und Einbettung.

pub mod app;
pub mod core;
pub mod error;
pub mod shared;

pub use app::{
    ArrivalEvent, Collaborators, MapMarker, MapRenderer, NavCommand, NavEffect, NavIntent,
    NavigationController, NavigationSession, NavigationState, NavigationStreams, RerouteRequest,
    RouteOptions, RouteProfile, RouteRequest, RoutingProvider, SessionHandle, SessionState,
    VoiceAnnouncer,
};
pub use core::{
    CameraParameters, Leg, Maneuver, ManeuverKind, ManeuverModifier, Position, RouteModel,
    RouteProgress, Step, UpcomingManeuver,
};
pub use error::{LocationError, NavError};
pub use shared::{Coordinate, NavigationOptions};
