//! Numerical building blocks shared by the dispersion and camera models
//!
//! - [`quadrature`]: globally adaptive 15-point Gauss–Kronrod integration, used for
//!   the puff residence-time integral and the in-band Planck integral.
//! - [`profiler`]: RAII timing scopes reported through `tracing`.
//!
//! # Example
//!
//! ```rust
//! use plume_sim_core::solver::{integrate, QuadratureConfig};
//!
//! let result = integrate(|x| x * x, 0.0, 3.0, &QuadratureConfig::default());
//! assert!(result.converged);
//! assert!((result.value - 9.0).abs() < 1e-12);
//! ```

pub mod profiler;
pub mod quadrature;

// Re-exports
pub use profiler::{ProfilerScope, StepTimer};
pub use quadrature::{integrate, integrate_with_breakpoints, QuadratureConfig, QuadratureResult};
