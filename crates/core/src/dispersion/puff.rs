//! Gaussian puff dispersion for a single time step.
//!
//! Every mesh point is rotated into the downwind/crosswind frame of the current wind
//! sample and receives
//!
//! ```text
//! C = alpha · f1 · (f2 + f3) · ∫₀^T exp(−(X' − u·t)² / (2·σy·σz)) dt
//!
//! alpha = Q / (2π·σy·σz)^1.5
//! f1    = exp(−Y'² / (2σy²))
//! f2,f3 = exp(−(Z ∓ Zm)² / (2σz²))           (direct and ground-reflected)
//! Zm    = H + 1.6 · ∛F · X'^(2/3) / u          (plume rise)
//! ```
//!
//! where `T` is the elapsed time inside the current wind window. Cells upwind of the
//! source (`X' ≤ 0`) and any cell whose value is not finite are masked to zero.
//!
//! Cells are independent, so the evaluation is a parallel map over the flattened
//! cell index.

use crate::atmosphere::AtmosphereState;
use crate::constants::GasProperties;
use crate::core_types::units::{MetersPerSecond, Radians};
use crate::error::{PlumeError, Result};
use crate::grid::{ConcentrationField, SpatialGrid};
use crate::leak::LeakDescriptor;
use crate::simulation::TimeGrid;
use crate::solver::{integrate_with_breakpoints, QuadratureConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::warn;

/// Counts of cells that needed special handling during one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Cells zeroed because an intermediate value was not finite
    pub masked_cells: usize,
    /// Cells whose residence-time integral did not meet the tolerance
    pub non_converged_cells: usize,
}

impl FieldStats {
    fn merge(self, other: Self) -> Self {
        Self {
            masked_cells: self.masked_cells + other.masked_cells,
            non_converged_cells: self.non_converged_cells + other.non_converged_cells,
        }
    }
}

/// Output of [`PuffModel::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuffEvaluation {
    /// Concentration field (ppm)
    pub field: ConcentrationField,
    /// Masking and convergence counters
    pub stats: FieldStats,
}

/// Ground-reflection sum `f2 + f3` for a receptor at height `z`, plume centreline
/// `zm` and vertical spread `sigma_z`.
///
/// At `z = 0` both terms coincide, so the ground receives twice the direct
/// contribution (no flux through the ground).
#[inline]
pub fn ground_reflection(z: f64, zm: f64, sigma_z: f64) -> f64 {
    let two_var = 2.0 * sigma_z * sigma_z;
    (-(z - zm).powi(2) / two_var).exp() + (-(z + zm).powi(2) / two_var).exp()
}

/// Effective plume height after buoyant rise at downwind distance `x`.
#[inline]
pub fn plume_rise_height(height: f64, buoyancy_factor: f64, x: f64, wind_speed: f64) -> f64 {
    height + 1.6 * buoyancy_factor.cbrt() * x.powf(2.0 / 3.0) / wind_speed
}

/// Per-step constants of the puff formula.
#[derive(Debug, Clone, Copy)]
pub struct PuffKernel {
    source_strength: f64,
    height: f64,
    buoyancy_factor: f64,
    wind_speed: f64,
    cos_theta: f64,
    sin_theta: f64,
    window: f64,
    atmosphere: AtmosphereState,
    quadrature: QuadratureConfig,
}

/// Value of one cell before unit conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellValue {
    /// Mass concentration (zero when masked)
    pub concentration: f64,
    /// True if the cell was zeroed because of a non-finite intermediate
    pub masked: bool,
    /// False if the residence-time integral missed its tolerance
    pub converged: bool,
}

impl CellValue {
    const MASKED: CellValue = CellValue {
        concentration: 0.0,
        masked: true,
        converged: true,
    };
}

impl PuffKernel {
    /// Bind the per-step constants.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Domain`] if `wind_speed` is zero, negative or not finite,
    /// or if `wind_angle` is not finite.
    pub fn new(
        leak: &LeakDescriptor,
        atmosphere: AtmosphereState,
        wind_speed: MetersPerSecond,
        wind_angle: Radians,
        window: f64,
        quadrature: QuadratureConfig,
    ) -> Result<Self> {
        let u = wind_speed.value();
        if !(u.is_finite() && u > 0.0) {
            return Err(PlumeError::domain(
                "wind_speed",
                format!("plume rise divides by wind speed, got {u} m/s"),
            ));
        }
        if !wind_angle.value().is_finite() {
            return Err(PlumeError::domain(
                "wind_angle",
                format!("direction must be finite, got {wind_angle}"),
            ));
        }

        Ok(Self {
            source_strength: leak.source_strength(),
            height: leak.height(),
            buoyancy_factor: leak.buoyancy_factor(),
            wind_speed: u,
            cos_theta: wind_angle.cos(),
            sin_theta: wind_angle.sin(),
            window,
            atmosphere,
            quadrature,
        })
    }

    /// Evaluate the puff formula at world position `(x, y, z)`.
    pub fn cell(&self, x: f64, y: f64, z: f64) -> CellValue {
        let downwind = (x * self.cos_theta + y * self.sin_theta).max(0.0);
        let crosswind = -x * self.sin_theta + y * self.cos_theta;
        self.cell_in_wind_frame(downwind, crosswind, z)
    }

    /// Evaluate at downwind distance `downwind`, crosswind offset `crosswind` and
    /// height `z`.
    pub fn cell_in_wind_frame(&self, downwind: f64, crosswind: f64, z: f64) -> CellValue {
        if downwind <= 0.0 {
            return CellValue::MASKED;
        }
        let u = self.wind_speed;
        let sigma_y = self.atmosphere.sigma_y(downwind);
        let sigma_z = self.atmosphere.sigma_z(downwind);
        let zm = plume_rise_height(self.height, self.buoyancy_factor, downwind, u);

        let alpha = self.source_strength / (2.0 * PI * sigma_y * sigma_z).powf(1.5);
        let f1 = (-crosswind * crosswind / (2.0 * sigma_y * sigma_y)).exp();
        if !alpha.is_finite() || f1.is_nan() {
            return CellValue::MASKED;
        }

        let prefactor = alpha * f1 * ground_reflection(z, zm, sigma_z);
        if prefactor == 0.0 {
            return CellValue {
                concentration: 0.0,
                masked: false,
                converged: true,
            };
        }

        let spread = 2.0 * sigma_y * sigma_z;
        let arrival = downwind / u;
        let residence = integrate_with_breakpoints(
            |t| (-(downwind - u * t).powi(2) / spread).exp(),
            0.0,
            self.window,
            &[arrival],
            &self.quadrature,
        );

        let concentration = prefactor * residence.value;
        if concentration.is_finite() {
            CellValue {
                concentration,
                masked: false,
                converged: residence.converged,
            }
        } else {
            CellValue::MASKED
        }
    }
}

/// Puff dispersion engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PuffModel {
    /// Settings of the residence-time integral
    pub quadrature: QuadratureConfig,
    /// Gas whose ppm conversion applies to the output
    pub gas: GasProperties,
}

impl Default for PuffModel {
    fn default() -> Self {
        Self::new(QuadratureConfig::default(), GasProperties::METHANE)
    }
}

impl PuffModel {
    /// Create a model with explicit quadrature settings and gas.
    pub fn new(quadrature: QuadratureConfig, gas: GasProperties) -> Self {
        Self { quadrature, gas }
    }

    /// Evaluate the ppm field of one time step.
    ///
    /// # Arguments
    ///
    /// * `grid` - Mesh to evaluate on
    /// * `current_time` - Time of the step (s), selects the integration window
    /// * `leak` - Source description
    /// * `atmosphere` - Stability class of this step's wind sample
    /// * `time_grid` - Provides the wind-window boundary rule
    /// * `wind_speed` - Wind speed of this step
    /// * `wind_angle` - Downwind direction of this step (model frame)
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Domain`] for a non-positive or non-finite wind speed.
    #[allow(clippy::too_many_arguments)]
    pub fn evaluate(
        &self,
        grid: &SpatialGrid,
        current_time: f64,
        leak: &LeakDescriptor,
        atmosphere: &AtmosphereState,
        time_grid: &TimeGrid,
        wind_speed: MetersPerSecond,
        wind_angle: Radians,
    ) -> Result<PuffEvaluation> {
        let window = time_grid.window_offset(current_time);
        let kernel = PuffKernel::new(
            leak,
            *atmosphere,
            wind_speed,
            wind_angle,
            window,
            self.quadrature,
        )?;

        let cells: Vec<CellValue> = (0..grid.cell_count())
            .into_par_iter()
            .map(|idx| {
                let (ix, iy, iz) = grid.cell_coords(idx);
                let (x, y, z) = grid.mesh_point(ix, iy, iz);
                kernel.cell(x, y, z)
            })
            .collect();

        let stats = cells.iter().fold(FieldStats::default(), |acc, c| {
            acc.merge(FieldStats {
                masked_cells: usize::from(c.masked),
                non_converged_cells: usize::from(!c.converged),
            })
        });
        if stats.non_converged_cells > 0 {
            warn!(
                "t={:.1}s: residence-time integral missed tolerance in {} of {} cells",
                current_time,
                stats.non_converged_cells,
                cells.len()
            );
        }

        let values = cells
            .iter()
            .map(|c| self.gas.to_ppm(c.concentration))
            .collect();
        let field = ConcentrationField::from_values(grid, values)?;

        Ok(PuffEvaluation { field, stats })
    }
}
