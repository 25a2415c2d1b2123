//! Infrared camera detection model
//!
//! Two independent stages:
//! - [`radiometry`]: noise floor and contrast from the sensor and scene temperatures
//! - [`geometry`]: pixel fan and concentration-pathlength along each sightline
//!
//! [`CameraDetector`] combines them into a per-field binary detection.
//!
//! # Example
//!
//! ```rust
//! use plume_sim_core::camera::{CameraDetector, CameraPose};
//! use plume_sim_core::grid::{ConcentrationField, SpatialGrid};
//!
//! let grid = SpatialGrid::from_linspace(
//!     (-200.0, 200.0, 41),
//!     (-200.0, 200.0, 41),
//!     (0.0, 10.0, 11),
//! )
//! .unwrap();
//! let field = ConcentrationField::uniform(&grid, 10.0);
//! let detector = CameraDetector::with_defaults().unwrap();
//! let result = detector.detect(&field, &grid, &CameraPose::default()).unwrap();
//! assert!(result.detected);
//! ```

mod detector;
pub mod geometry;
pub mod radiometry;

pub use detector::{CameraDetector, DetectionResult};
pub use geometry::{CameraPose, PixelFan, SightlineSampler};
pub use radiometry::{RadiometricTerms, SceneTemperatures, SensorConfig};
