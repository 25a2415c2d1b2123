//! Gaussian puff dispersion
//!
//! [`PuffModel`] evaluates one raw field per time step; [`stitch_continuous_release`]
//! turns the raw per-window history into a continuous-release approximation.

mod puff;
mod stitching;

pub use puff::{
    ground_reflection, plume_rise_height, CellValue, FieldStats, PuffEvaluation, PuffKernel,
    PuffModel,
};
pub use stitching::stitch_continuous_release;
