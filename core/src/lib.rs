//! Scene simulation and vision core for the rotating-sweep sensor scope.
//!
//! Each tick advances the point targets, paints them with a decaying trail,
//! a sweep line and clutter into a raw RGBA image, then converts that image
//! into a list of filtered blob detections.

pub mod math;
pub mod prelude;
pub mod scene;
pub mod scope_interface;
pub mod simulation;
pub mod telemetry;
pub mod vision;

pub use prelude::{CoreError, CoreResult, FrameOptions, ProcessingStage, SensorGeometry};
pub use simulation::{FrameReport, SweepSimulation};
