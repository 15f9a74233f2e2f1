//! Use-Cases der Application-Layer-Orchestrierung.

pub mod camera;
pub mod guidance;
pub mod lifecycle;
pub mod rerouting;
