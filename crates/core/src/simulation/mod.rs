//! Puff simulation pipeline
//!
//! `PuffSimulation` runs the model as two explicit passes:
//! 1. Raw pass: one [`PuffModel`] evaluation per time step, with the atmosphere
//!    classified from that step's wind sample
//! 2. Stitching pass: [`stitch_continuous_release`] over the raw history
//!
//! # Example
//!
//! ```rust
//! use plume_sim_core::atmosphere::WindSeries;
//! use plume_sim_core::grid::SpatialGrid;
//! use plume_sim_core::leak::LeakDescriptor;
//! use plume_sim_core::simulation::{PuffSimulation, SimulationConfig};
//!
//! let config = SimulationConfig::default();
//! let leak = LeakDescriptor::continuous(1.0, 2.01).unwrap();
//! let grid =
//!     SpatialGrid::from_linspace((-10.0, 30.0, 5), (-10.0, 10.0, 5), (0.0, 4.0, 3)).unwrap();
//! let wind = WindSeries::from_meteorological(&[3.0; 10], &[180.0; 10]).unwrap();
//!
//! let results = PuffSimulation::new(config, leak, grid, wind).unwrap().run().unwrap();
//! assert_eq!(results.len(), 20);
//! ```

mod results;
mod time_grid;

pub use results::SimulationResults;
pub use time_grid::TimeGrid;

use crate::atmosphere::{AtmosphereState, WindSample, WindSeries};
use crate::constants::GasProperties;
use crate::core_types::units::Seconds;
use crate::dispersion::{stitch_continuous_release, PuffModel};
use crate::error::Result;
use crate::grid::SpatialGrid;
use crate::leak::LeakDescriptor;
use crate::solver::{ProfilerScope, QuadratureConfig, StepTimer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Time parameters and numerical settings of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulated duration
    pub total_time: Seconds,
    /// Spacing of the time axis
    pub time_step: Seconds,
    /// Interval between wind samples
    pub wind_update_interval: Seconds,
    /// Settings of the residence-time integral
    pub quadrature: QuadratureConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_time: Seconds::new(600.0),
            time_step: Seconds::new(30.0),
            wind_update_interval: Seconds::new(60.0),
            quadrature: QuadratureConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Build the time axis described by this config.
    ///
    /// # Errors
    ///
    /// See [`TimeGrid::new`].
    pub fn time_grid(&self) -> Result<TimeGrid> {
        TimeGrid::new(self.total_time, self.time_step, self.wind_update_interval)
    }
}

/// Validated puff simulation, ready to run.
#[derive(Debug, Clone)]
pub struct PuffSimulation {
    config: SimulationConfig,
    leak: LeakDescriptor,
    grid: SpatialGrid,
    time_grid: TimeGrid,
    wind_per_step: Vec<WindSample>,
    gas: GasProperties,
}

impl PuffSimulation {
    /// Validate the inputs and expand the wind series onto the time axis.
    ///
    /// # Arguments
    ///
    /// * `config` - Time parameters and quadrature settings
    /// * `leak` - Source description
    /// * `grid` - Evaluation mesh
    /// * `wind` - One sample per wind-update interval, at least as many as the time
    ///   axis needs
    ///
    /// # Errors
    ///
    /// Returns [`crate::PlumeError::Configuration`] for an invalid time axis or a wind
    /// series too short to cover it.
    pub fn new(
        config: SimulationConfig,
        leak: LeakDescriptor,
        grid: SpatialGrid,
        wind: WindSeries,
    ) -> Result<Self> {
        let time_grid = config.time_grid()?;
        let wind_per_step = wind.per_step(&time_grid)?;

        Ok(Self {
            config,
            leak,
            grid,
            time_grid,
            wind_per_step,
            gas: GasProperties::METHANE,
        })
    }

    /// Use a different gas for the ppm conversion.
    #[must_use]
    pub fn with_gas(mut self, gas: GasProperties) -> Self {
        self.gas = gas;
        self
    }

    /// Time axis of the run
    pub fn time_grid(&self) -> &TimeGrid {
        &self.time_grid
    }

    /// Evaluation mesh
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Wind sample applied at each step
    pub fn wind_per_step(&self) -> &[WindSample] {
        &self.wind_per_step
    }

    /// Run both passes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PlumeError::Domain`] if a step's wind speed is zero, negative
    /// or not finite. The run stops at the first failing step.
    pub fn run(&self) -> Result<SimulationResults> {
        let (nx, ny, nz) = self.grid.dims();
        info!(
            "Starting puff simulation: {} steps of {}, {}x{}x{} grid, leak {:.3} g/s at {:.2}m",
            self.time_grid.len(),
            self.config.time_step,
            nx,
            ny,
            nz,
            self.leak.emission_rate(),
            self.leak.height()
        );

        let model = PuffModel::new(self.config.quadrature, self.gas);
        let mut timer = StepTimer::new();
        let mut raw_history = Vec::with_capacity(self.time_grid.len());
        let mut field_stats = Vec::with_capacity(self.time_grid.len());

        for (m, (&t, wind)) in self
            .time_grid
            .time_axis()
            .iter()
            .zip(&self.wind_per_step)
            .enumerate()
        {
            let scope = ProfilerScope::new("puff_step");
            let atmosphere = AtmosphereState::classify(wind.speed.value())?;
            let evaluation = model.evaluate(
                &self.grid,
                t,
                &self.leak,
                &atmosphere,
                &self.time_grid,
                wind.speed,
                wind.direction,
            )?;
            timer.record(scope.elapsed_ms());

            debug!(
                "Step {}: t={:.1}s, wind={:.2} m/s @ {:.3} rad, class {}, max={:.4} ppm, masked={}",
                m,
                t,
                wind.speed.value(),
                wind.direction.value(),
                atmosphere.stability_class,
                evaluation.field.max(),
                evaluation.stats.masked_cells
            );

            raw_history.push(evaluation.field);
            field_stats.push(evaluation.stats);
        }

        let concentration_history = {
            let _scope = ProfilerScope::new("stitch_continuous_release");
            stitch_continuous_release(&raw_history, &self.time_grid)?
        };

        let results = SimulationResults {
            time_axis: self.time_grid.time_axis().to_vec(),
            leak: self.leak,
            raw_history,
            concentration_history,
            grid: self.grid.clone(),
            leak_height: self.leak.height(),
            wind_speeds: self.wind_per_step.iter().map(|w| w.speed.value()).collect(),
            wind_angles: self
                .wind_per_step
                .iter()
                .map(|w| w.direction.value())
                .collect(),
            field_stats,
        };

        info!(
            "Run finished: peak {:.4} ppm, {:.1} ms/step, slowest {:.1} ms, {} non-converged",
            results.peak_concentration(),
            timer.mean_ms(),
            timer.slowest_ms(),
            results.total_stats().non_converged_cells
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> SpatialGrid {
        SpatialGrid::from_linspace((-10.0, 30.0, 5), (-10.0, 10.0, 5), (0.0, 4.0, 3)).unwrap()
    }

    #[test]
    fn test_default_config_axis() {
        let tg = SimulationConfig::default().time_grid().unwrap();
        assert_eq!(tg.len(), 20);
        assert_eq!(tg.repeat_factor(), 2);
    }

    #[test]
    fn test_short_wind_series_rejected() {
        let leak = LeakDescriptor::continuous(1.0, 2.0).unwrap();
        let wind = WindSeries::from_meteorological(&[3.0; 9], &[180.0; 9]).unwrap();
        let config = SimulationConfig::default();
        assert!(PuffSimulation::new(config, leak, small_grid(), wind).is_err());
    }

    #[test]
    fn test_calm_wind_aborts_run() {
        let leak = LeakDescriptor::continuous(1.0, 2.0).unwrap();
        let mut speeds = [3.0; 10];
        speeds[4] = 0.0;
        let wind = WindSeries::from_meteorological(&speeds, &[180.0; 10]).unwrap();
        let config = SimulationConfig::default();
        let sim = PuffSimulation::new(config, leak, small_grid(), wind).unwrap();
        assert!(matches!(
            sim.run(),
            Err(crate::PlumeError::Domain { quantity: "wind_speed", .. })
        ));
    }

    #[test]
    fn test_results_record_inputs() {
        let leak = LeakDescriptor::continuous(1.0, 2.01).unwrap();
        let wind = WindSeries::from_meteorological(&[3.0; 10], &[180.0; 10]).unwrap();
        let results = PuffSimulation::new(SimulationConfig::default(), leak, small_grid(), wind)
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(results.len(), 20);
        assert_eq!(results.raw_history.len(), 20);
        assert_eq!(results.leak_height, 2.01);
        assert!(results.wind_speeds.iter().all(|&u| u == 3.0));
        // 180° meteorological maps to +x in the model frame
        assert!(results.wind_angles.iter().all(|a| a.abs() < 1e-12));
        assert!(results.field_at(19).is_some());
        assert!(results.field_at(20).is_none());
        assert!(results.peak_concentration() >= 0.0);
    }
}
