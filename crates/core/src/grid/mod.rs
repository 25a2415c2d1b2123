//! Spatial mesh and the concentration fields defined on it

pub mod concentration_field;
pub mod spatial_grid;

// Re-export main types
pub use concentration_field::ConcentrationField;
pub use spatial_grid::{linspace_axis, SpatialGrid};
