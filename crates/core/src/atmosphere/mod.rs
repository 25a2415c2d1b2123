//! Atmospheric forcing for the puff model.
//!
//! This module covers the two atmospheric inputs of the dispersion engine:
//! - Stability classes and their empirical dispersion coefficients
//! - Wind time series (speed + direction per wind-update interval)
//!
//! # References
//!
//! - Pasquill, F. (1961). "The estimation of the dispersion of windborne material."
//! - Briggs, G.A. (1973). "Diffusion estimation for small emissions."

mod stability;
mod wind;

pub use stability::{AtmosphereState, DispersionCoefficients, StabilityClass, DISPERSION_TABLE};
pub use wind::{WindSample, WindSeries};
