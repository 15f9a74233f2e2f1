//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält Geometrie und Konfiguration, die von `core` und `app`
//! gleichermaßen genutzt werden.

pub mod geo;
pub mod options;
pub mod profile;

pub use geo::{Coordinate, LocalFrame};
pub use options::{
    ArrivalPolicy, BroadcastOptions, CameraOptions, NavigationOptions, OffRouteOptions,
    TrackerOptions,
};
pub use profile::{ProviderParams, RouteProfile};
