//! Discrete time axis and wind-update windowing.
//!
//! The simulation evaluates one puff field per time step. Wind is only updated every
//! `wind_update_interval` seconds, so the steps are grouped into windows of
//! `repeat_factor = wind_update_interval / time_step` consecutive samples.
//!
//! ```text
//! total=600, step=30, interval=60
//! time_axis:  30  60 | 90 120 | 150 180 | ... | 570 600
//! window:      0   0 |  1   1 |   2   2 | ... |   9   9
//! offset:     30  60 | 30  60 |  30  60 | ... |  30  60
//! ```

use crate::core_types::units::Seconds;
use crate::error::{PlumeError, Result};
use serde::{Deserialize, Serialize};

/// Relative tolerance for "exact" floating-point multiples.
const MULTIPLE_TOLERANCE: f64 = 1e-9;

/// Simulation time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    total_time: Seconds,
    time_step: Seconds,
    wind_update_interval: Seconds,
    time_axis: Vec<f64>,
}

impl TimeGrid {
    /// Build the time axis `step, 2·step, …, total_time`.
    ///
    /// When `total_time` is not a multiple of `time_step` the axis has
    /// `ceil(total_time / time_step)` points and the last one is clamped to `total_time`.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if any duration is non-positive or
    /// non-finite, if `time_step > total_time`, or if `wind_update_interval` is not an
    /// integer multiple of `time_step`.
    pub fn new(
        total_time: Seconds,
        time_step: Seconds,
        wind_update_interval: Seconds,
    ) -> Result<Self> {
        let total = PlumeError::require_positive("total_time", total_time.value())?;
        let step = PlumeError::require_positive("time_step", time_step.value())?;
        let interval =
            PlumeError::require_positive("wind_update_interval", wind_update_interval.value())?;

        if step > total {
            return Err(PlumeError::configuration(
                "time_step",
                format!("step {step} s exceeds total time {total} s"),
            ));
        }

        let ratio = interval / step;
        if ratio.round() < 1.0 || (ratio - ratio.round()).abs() > MULTIPLE_TOLERANCE * ratio {
            return Err(PlumeError::configuration(
                "wind_update_interval",
                format!("{interval} s is not an integer multiple of the {step} s time step"),
            ));
        }

        let n = ((total / step) * (1.0 - MULTIPLE_TOLERANCE)).ceil().max(1.0) as usize;
        let time_axis = (1..=n).map(|i| (step * i as f64).min(total)).collect();

        Ok(Self {
            total_time,
            time_step,
            wind_update_interval,
            time_axis,
        })
    }

    /// Total simulated time
    pub fn total_time(&self) -> Seconds {
        self.total_time
    }

    /// Spacing of the time axis
    pub fn time_step(&self) -> Seconds {
        self.time_step
    }

    /// Interval between wind updates
    pub fn wind_update_interval(&self) -> Seconds {
        self.wind_update_interval
    }

    /// Time axis in seconds (strictly increasing)
    pub fn time_axis(&self) -> &[f64] {
        &self.time_axis
    }

    /// Number of time steps
    pub fn len(&self) -> usize {
        self.time_axis.len()
    }

    /// Always false for a validated grid; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.time_axis.is_empty()
    }

    /// Time steps per wind-update window.
    pub fn repeat_factor(&self) -> usize {
        (self.wind_update_interval.value() / self.time_step.value()).round() as usize
    }

    /// Wind samples needed to cover the whole time axis.
    pub fn wind_samples_needed(&self) -> usize {
        self.len().div_ceil(self.repeat_factor())
    }

    /// Elapsed time inside the current wind window at time `t`.
    ///
    /// A sample landing exactly on a window boundary closes out the previous window,
    /// so the offset is the full interval rather than zero.
    pub fn window_offset(&self, t: f64) -> f64 {
        let interval = self.wind_update_interval.value();
        let rem = t.rem_euclid(interval);
        let tol = MULTIPLE_TOLERANCE * interval;
        if rem <= tol || interval - rem <= tol {
            interval
        } else {
            rem
        }
    }

    /// Wind window that time index `m` belongs to.
    pub fn window_index(&self, m: usize) -> usize {
        m / self.repeat_factor()
    }

    /// Last time index inside the same wind window as `m`, clamped to the axis for a
    /// trailing partial window.
    pub fn lookahead_index(&self, m: usize) -> usize {
        let repeat = self.repeat_factor();
        ((self.window_index(m) + 1) * repeat - 1).min(self.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(total: f64, step: f64, interval: f64) -> Result<TimeGrid> {
        TimeGrid::new(Seconds::new(total), Seconds::new(step), Seconds::new(interval))
    }

    #[test]
    fn test_default_axis_has_twenty_points() {
        let g = grid(600.0, 30.0, 60.0).unwrap();
        assert_eq!(g.len(), 20);
        let expected: Vec<f64> = (1..=20).map(|i| 30.0 * f64::from(i)).collect();
        assert_eq!(g.time_axis(), expected.as_slice());
        assert_eq!(g.repeat_factor(), 2);
        assert_eq!(g.wind_samples_needed(), 10);
    }

    #[test]
    fn test_non_multiple_total_is_clamped() {
        let g = grid(100.0, 30.0, 30.0).unwrap();
        assert_eq!(g.time_axis(), &[30.0, 60.0, 90.0, 100.0]);
    }

    #[test]
    fn test_axis_is_strictly_increasing() {
        let g = grid(61.0, 0.5, 1.5).unwrap();
        assert!(g.time_axis().windows(2).all(|w| w[1] > w[0]));
        assert_eq!(*g.time_axis().last().unwrap(), 61.0);
    }

    #[test]
    fn test_invalid_steps_rejected() {
        assert!(grid(600.0, 0.0, 60.0).is_err());
        assert!(grid(600.0, -30.0, 60.0).is_err());
        assert!(grid(600.0, 700.0, 700.0).is_err());
        assert!(grid(600.0, 30.0, 45.0).is_err());
        assert!(grid(600.0, 30.0, 15.0).is_err());
        assert!(grid(f64::NAN, 30.0, 60.0).is_err());
    }

    #[test]
    fn test_boundary_sample_closes_previous_window() {
        let g = grid(600.0, 30.0, 60.0).unwrap();
        assert_eq!(g.window_offset(30.0), 30.0);
        assert_eq!(g.window_offset(60.0), 60.0);
        assert_eq!(g.window_offset(90.0), 30.0);
        assert_eq!(g.window_offset(120.0), 60.0);
        assert_eq!(g.window_offset(600.0), 60.0);
    }

    #[test]
    fn test_lookahead_points_at_window_end() {
        let g = grid(600.0, 30.0, 60.0).unwrap();
        let lookahead: Vec<usize> = (0..g.len()).map(|m| g.lookahead_index(m)).collect();
        assert_eq!(&lookahead[..6], &[1, 1, 3, 3, 5, 5]);
        assert_eq!(lookahead[19], 19);

        // Partial trailing window is clamped onto the axis
        let g = grid(90.0, 30.0, 60.0).unwrap();
        assert_eq!(g.lookahead_index(2), 2);
    }
}
