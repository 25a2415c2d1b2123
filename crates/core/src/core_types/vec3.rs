//! Vector type alias for 3D positions and directions.

use nalgebra::Vector3;

/// 3D vector type for positions and directions.
///
/// This is a simple alias for `nalgebra::Vector3<f64>`, used for camera locations,
/// aim vectors and ray endpoints.
pub type Vec3 = Vector3<f64>;
