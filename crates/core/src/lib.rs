//! Plume Simulation Core Library
//!
//! Gaussian puff dispersion of a gas leak under time-varying wind, and an infrared
//! camera model that decides whether the resulting plume would be detected.
//!
//! ## Dispersion
//!
//! - Stability classes with empirical dispersion-curve coefficients
//! - Windowed time axis with wind held constant per update interval
//! - Per-cell residence-time integrals evaluated in parallel with adaptive
//!   Gauss–Kronrod quadrature
//! - Ground reflection and buoyant plume rise
//! - Continuous-release stitching across wind windows
//!
//! ## Detection
//!
//! - Blackbody band integrals for the sensor noise floor and plume contrast
//! - Concentration-pathlength sampled along every pixel sightline
//! - Triggered-pixel count rescaled to full sensor resolution

// Core types and utilities
pub mod constants;
pub mod core_types;
pub mod error;
pub mod solver;

// Model inputs
pub mod atmosphere;
pub mod grid;
pub mod leak;

// Models and orchestration
pub mod camera;
pub mod dispersion;
pub mod simulation;

// Re-export core types
pub use constants::{GasProperties, PhysicalConstants};
pub use core_types::{Degrees, Kelvin, MetersPerSecond, Radians, Seconds, Vec3};
pub use error::{PlumeError, Result};

// Re-export model types
pub use atmosphere::{AtmosphereState, StabilityClass, WindSample, WindSeries};
pub use camera::{CameraDetector, CameraPose, DetectionResult, SceneTemperatures, SensorConfig};
pub use dispersion::{stitch_continuous_release, FieldStats, PuffEvaluation, PuffModel};
pub use grid::{ConcentrationField, SpatialGrid};
pub use leak::{LeakDescriptor, LeakKind};
pub use simulation::{PuffSimulation, SimulationConfig, SimulationResults, TimeGrid};
