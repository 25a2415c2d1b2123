//! Simulation output record.

use crate::dispersion::FieldStats;
use crate::grid::{ConcentrationField, SpatialGrid};
use crate::leak::LeakDescriptor;
use serde::{Deserialize, Serialize};

/// Everything a downstream consumer needs from one run.
///
/// Histories are indexed like `time_axis`. Persisting this record is left to the
/// caller; it derives `serde` traits so any format can be used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    /// Time of each step (s)
    pub time_axis: Vec<f64>,
    /// Leak that was simulated
    pub leak: LeakDescriptor,
    /// Per-step fields before the continuous-release correction (ppm)
    pub raw_history: Vec<ConcentrationField>,
    /// Stitched per-step fields (ppm)
    pub concentration_history: Vec<ConcentrationField>,
    /// Mesh the fields are defined on
    pub grid: SpatialGrid,
    /// Release height (m)
    pub leak_height: f64,
    /// Wind speed applied at each step (m/s)
    pub wind_speeds: Vec<f64>,
    /// Downwind direction applied at each step (rad, model frame)
    pub wind_angles: Vec<f64>,
    /// Masking and convergence counters of each raw evaluation
    pub field_stats: Vec<FieldStats>,
}

impl SimulationResults {
    /// Number of time steps
    pub fn len(&self) -> usize {
        self.time_axis.len()
    }

    /// True if the run produced no steps
    pub fn is_empty(&self) -> bool {
        self.time_axis.is_empty()
    }

    /// Stitched field at step `index`
    pub fn field_at(&self, index: usize) -> Option<&ConcentrationField> {
        self.concentration_history.get(index)
    }

    /// Final stitched field
    pub fn last_field(&self) -> Option<&ConcentrationField> {
        self.concentration_history.last()
    }

    /// Highest stitched concentration over the whole run (ppm), zero for an empty run.
    pub fn peak_concentration(&self) -> f64 {
        self.concentration_history
            .iter()
            .map(ConcentrationField::max)
            .fold(0.0, f64::max)
    }

    /// Summed counters over all steps
    pub fn total_stats(&self) -> FieldStats {
        self.field_stats
            .iter()
            .fold(FieldStats::default(), |acc, s| FieldStats {
                masked_cells: acc.masked_cells + s.masked_cells,
                non_converged_cells: acc.non_converged_cells + s.non_converged_cells,
            })
    }
}
