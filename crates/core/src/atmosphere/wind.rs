//! Wind time series.
//!
//! Wind is sampled once per wind-update interval (typically 1-minute station data)
//! and held constant across the finer simulation steps inside that interval.

use crate::core_types::units::{Degrees, MetersPerSecond, Radians};
use crate::error::{PlumeError, Result};
use crate::simulation::TimeGrid;
use serde::{Deserialize, Serialize};

/// One wind observation in the model frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindSample {
    /// Wind speed
    pub speed: MetersPerSecond,
    /// Downwind direction, radians counter-clockwise from +x
    pub direction: Radians,
}

impl WindSample {
    /// Create a sample from model-frame values.
    pub fn new(speed: MetersPerSecond, direction: Radians) -> Self {
        Self { speed, direction }
    }

    /// Create a sample from a meteorological direction (degrees from north).
    pub fn from_meteorological(speed: MetersPerSecond, direction: Degrees) -> Self {
        Self {
            speed,
            direction: direction.to_math_radians(),
        }
    }
}

/// Ordered wind samples, one per wind-update interval.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WindSeries {
    samples: Vec<WindSample>,
}

impl WindSeries {
    /// Wrap already-converted samples.
    pub fn new(samples: Vec<WindSample>) -> Self {
        Self { samples }
    }

    /// Build from raw station columns: speeds (m/s) and directions (degrees from north).
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if the columns differ in length or contain
    /// non-finite values.
    pub fn from_meteorological(speeds: &[f64], directions_deg: &[f64]) -> Result<Self> {
        if speeds.len() != directions_deg.len() {
            return Err(PlumeError::configuration(
                "wind",
                format!(
                    "{} speeds but {} directions",
                    speeds.len(),
                    directions_deg.len()
                ),
            ));
        }
        let mut values = speeds.iter().chain(directions_deg);
        if let Some(bad) = values.find(|v| !v.is_finite()) {
            return Err(PlumeError::configuration(
                "wind",
                format!("non-finite wind value {bad}"),
            ));
        }

        let samples = speeds
            .iter()
            .zip(directions_deg)
            .map(|(&s, &d)| {
                WindSample::from_meteorological(MetersPerSecond::new(s), Degrees::new(d))
            })
            .collect();
        Ok(Self { samples })
    }

    /// Number of wind-update samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in order.
    pub fn samples(&self) -> &[WindSample] {
        &self.samples
    }

    /// Sequential run of the samples needed to cover `time_grid`, starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if fewer samples remain after `start`.
    pub fn window_for(&self, start: usize, time_grid: &TimeGrid) -> Result<WindSeries> {
        let needed = time_grid.wind_samples_needed();
        let end = start.saturating_add(needed);
        if end > self.samples.len() {
            return Err(PlumeError::configuration(
                "wind",
                format!(
                    "need {needed} samples from index {start}, only {} available",
                    self.samples.len()
                ),
            ));
        }
        Ok(WindSeries::new(self.samples[start..end].to_vec()))
    }

    /// Replicate each sample across the time steps it governs, one entry per point of
    /// the time axis.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if the series is too short for the grid.
    pub fn per_step(&self, time_grid: &TimeGrid) -> Result<Vec<WindSample>> {
        let steps = time_grid.len();
        let repeat = time_grid.repeat_factor();
        let per_step: Vec<WindSample> = self
            .samples
            .iter()
            .flat_map(|s| std::iter::repeat_n(*s, repeat))
            .take(steps)
            .collect();

        if per_step.len() < steps {
            return Err(PlumeError::configuration(
                "wind",
                format!(
                    "{} samples cover {} steps, time axis has {steps}",
                    self.samples.len(),
                    per_step.len()
                ),
            ));
        }
        Ok(per_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::units::Seconds;

    fn grid() -> TimeGrid {
        TimeGrid::new(Seconds::new(600.0), Seconds::new(30.0), Seconds::new(60.0)).unwrap()
    }

    #[test]
    fn test_from_meteorological_converts_directions() {
        let series = WindSeries::from_meteorological(&[2.2, 2.5], &[211.0, 180.0]).unwrap();
        assert_eq!(series.len(), 2);
        assert!((series.samples()[0].direction.value() - 31.0_f64.to_radians()).abs() < 1e-12);
        assert!(series.samples()[1].direction.value().abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_columns_rejected() {
        assert!(WindSeries::from_meteorological(&[1.0, 2.0], &[0.0]).is_err());
        assert!(WindSeries::from_meteorological(&[f64::NAN], &[0.0]).is_err());
    }

    #[test]
    fn test_per_step_replicates_each_window() {
        let speeds: Vec<f64> = (1..=10).map(f64::from).collect();
        let dirs = vec![200.0; 10];
        let series = WindSeries::from_meteorological(&speeds, &dirs).unwrap();

        let steps = series.per_step(&grid()).unwrap();
        assert_eq!(steps.len(), 20);
        assert_eq!(steps[0].speed.value(), 1.0);
        assert_eq!(steps[1].speed.value(), 1.0);
        assert_eq!(steps[2].speed.value(), 2.0);
        assert_eq!(steps[19].speed.value(), 10.0);
    }

    #[test]
    fn test_per_step_rejects_short_series() {
        let series = WindSeries::from_meteorological(&[2.0; 3], &[200.0; 3]).unwrap();
        assert!(series.per_step(&grid()).is_err());
    }

    #[test]
    fn test_window_for_slices_sequentially() {
        let speeds: Vec<f64> = (0..15).map(f64::from).collect();
        let series = WindSeries::from_meteorological(&speeds, &[190.0; 15]).unwrap();

        let window = series.window_for(3, &grid()).unwrap();
        assert_eq!(window.len(), 10);
        assert_eq!(window.samples()[0].speed.value(), 3.0);
        assert_eq!(window.samples()[9].speed.value(), 12.0);

        assert!(series.window_for(6, &grid()).is_err());
    }
}
