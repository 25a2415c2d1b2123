//! Continuous-release correction across wind windows.
//!
//! Each raw field treats the puff as if it had been released at the start of its own
//! wind window. The stitching pass carries every window's settled state forward into
//! the next window:
//!
//! ```text
//! offset[m + rep] = raw[lookahead(m)] − raw[m]
//! final[m]        = raw[m] + offset[m]          (offset = 0 in the first window)
//! ```
//!
//! where `lookahead(m)` is the last index of `m`'s window and `rep` the number of
//! steps per window. This is a numerical approximation at the window boundaries; it
//! is not derived from the dispersion physics.

use crate::error::{PlumeError, Result};
use crate::grid::ConcentrationField;
use crate::simulation::TimeGrid;

/// Apply the continuous-release correction to a raw per-step history.
///
/// # Errors
///
/// Returns [`PlumeError::Configuration`] if the history length differs from the time
/// axis or the fields have mismatched dimensions.
pub fn stitch_continuous_release(
    raw: &[ConcentrationField],
    time_grid: &TimeGrid,
) -> Result<Vec<ConcentrationField>> {
    let steps = time_grid.len();
    if raw.len() != steps {
        return Err(PlumeError::configuration(
            "concentration_history",
            format!("{} fields for a {steps}-step time axis", raw.len()),
        ));
    }

    let repeat = time_grid.repeat_factor();
    let mut offsets: Vec<Option<ConcentrationField>> = vec![None; steps];
    for m in 0..steps.saturating_sub(repeat) {
        let settled = &raw[time_grid.lookahead_index(m)];
        offsets[m + repeat] = Some(settled.difference(&raw[m])?);
    }

    raw.iter()
        .zip(offsets)
        .map(|(field, offset)| match offset {
            Some(offset) => field.added(&offset),
            None => Ok(field.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::units::Seconds;
    use crate::grid::SpatialGrid;

    fn grid() -> SpatialGrid {
        SpatialGrid::from_linspace((0.0, 1.0, 2), (0.0, 1.0, 2), (0.0, 1.0, 2)).unwrap()
    }

    fn time_grid(total: f64) -> TimeGrid {
        TimeGrid::new(Seconds::new(total), Seconds::new(30.0), Seconds::new(60.0)).unwrap()
    }

    #[test]
    fn test_first_window_is_untouched() {
        let g = grid();
        let raw: Vec<_> = [1.0, 3.0, 5.0, 9.0]
            .iter()
            .map(|&v| ConcentrationField::uniform(&g, v))
            .collect();
        let stitched = stitch_continuous_release(&raw, &time_grid(120.0)).unwrap();
        assert_eq!(stitched[0], raw[0]);
        assert_eq!(stitched[1], raw[1]);
        // offset[2] = raw[1] - raw[0] = 2, offset[3] = raw[1] - raw[1] = 0
        assert_eq!(stitched[2].max(), 7.0);
        assert_eq!(stitched[3].max(), 9.0);
    }

    #[test]
    fn test_constant_forcing_leaves_window_ends_unchanged() {
        let g = grid();
        let tg = time_grid(600.0);
        // Field depends only on the position within the wind window
        let raw: Vec<_> = (0..tg.len())
            .map(|m| ConcentrationField::uniform(&g, if m % 2 == 0 { 4.0 } else { 10.0 }))
            .collect();
        let stitched = stitch_continuous_release(&raw, &tg).unwrap();
        for m in (1..tg.len()).step_by(2) {
            assert_eq!(stitched[m], raw[m]);
        }
        // Early samples of later windows inherit the settled state of the previous one
        assert_eq!(stitched[2].max(), 10.0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let g = grid();
        let raw = vec![ConcentrationField::zeros(&g); 3];
        assert!(stitch_continuous_release(&raw, &time_grid(120.0)).is_err());
    }
}
