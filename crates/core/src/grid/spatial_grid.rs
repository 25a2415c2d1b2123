//! Rectilinear 3D mesh on which concentration fields are evaluated
//!
//! The mesh is the outer product of three strictly increasing coordinate axes. The
//! leak sits at the horizontal origin, so axes normally straddle zero in x and y and
//! start at ground level in z.
//!
//! Cells are stored with z varying fastest, then y, then x:
//! `index = (ix * ny + iy) * nz + iz`.

use crate::error::{PlumeError, Result};
use serde::{Deserialize, Serialize};

/// Relative tolerance when checking that an axis is uniformly spaced.
const UNIFORM_TOLERANCE: f64 = 1e-6;

/// Rectilinear mesh defined by three coordinate axes (m).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialGrid {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl SpatialGrid {
    /// Create a grid from explicit coordinate axes.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if an axis has fewer than two points,
    /// contains non-finite values, or is not strictly increasing.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self> {
        validate_axis("x", &x)?;
        validate_axis("y", &y)?;
        validate_axis("z", &z)?;
        Ok(Self { x, y, z })
    }

    /// Create a grid of evenly spaced axes, each given as `(start, stop, points)`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`SpatialGrid::new`].
    pub fn from_linspace(
        x: (f64, f64, usize),
        y: (f64, f64, usize),
        z: (f64, f64, usize),
    ) -> Result<Self> {
        Self::new(
            linspace_axis(x.0, x.1, x.2),
            linspace_axis(y.0, y.1, y.2),
            linspace_axis(z.0, z.1, z.2),
        )
    }

    /// x coordinates
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// y coordinates
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// z coordinates
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Points along each axis `(nx, ny, nz)`
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.x.len(), self.y.len(), self.z.len())
    }

    /// Total number of mesh cells
    pub fn cell_count(&self) -> usize {
        self.x.len() * self.y.len() * self.z.len()
    }

    /// Flat index of mesh point `(ix, iy, iz)`
    #[inline]
    pub fn cell_index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        (ix * self.y.len() + iy) * self.z.len() + iz
    }

    /// Inverse of [`SpatialGrid::cell_index`]
    #[inline]
    pub fn cell_coords(&self, index: usize) -> (usize, usize, usize) {
        let nz = self.z.len();
        let ny = self.y.len();
        (index / (ny * nz), (index / nz) % ny, index % nz)
    }

    /// World coordinates of mesh point `(ix, iy, iz)`
    #[inline]
    pub fn mesh_point(&self, ix: usize, iy: usize, iz: usize) -> (f64, f64, f64) {
        (self.x[ix], self.y[iy], self.z[iz])
    }

    /// Lower corner of the mesh
    pub fn origin(&self) -> (f64, f64, f64) {
        (self.x[0], self.y[0], self.z[0])
    }

    /// Spacing of each axis, for grids whose axes are uniform.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if an axis is not evenly spaced.
    pub fn uniform_steps(&self) -> Result<(f64, f64, f64)> {
        Ok((
            uniform_step("x", &self.x)?,
            uniform_step("y", &self.y)?,
            uniform_step("z", &self.z)?,
        ))
    }
}

/// `n` evenly spaced points from `start` to `stop` inclusive.
pub fn linspace_axis(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut axis: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            axis[n - 1] = stop;
            axis
        }
    }
}

fn validate_axis(name: &'static str, axis: &[f64]) -> Result<()> {
    if axis.len() < 2 {
        return Err(PlumeError::configuration(
            name,
            format!("axis needs at least 2 points, got {}", axis.len()),
        ));
    }
    if let Some(bad) = axis.iter().find(|v| !v.is_finite()) {
        return Err(PlumeError::configuration(
            name,
            format!("non-finite coordinate {bad}"),
        ));
    }
    if let Some(pos) = axis.windows(2).position(|w| w[1] <= w[0]) {
        return Err(PlumeError::configuration(
            name,
            format!(
                "axis must be strictly increasing ({} then {})",
                axis[pos],
                axis[pos + 1]
            ),
        ));
    }
    Ok(())
}

fn uniform_step(name: &'static str, axis: &[f64]) -> Result<f64> {
    let step = axis[1] - axis[0];
    let uniform = axis
        .windows(2)
        .all(|w| ((w[1] - w[0]) - step).abs() <= UNIFORM_TOLERANCE * step);
    if uniform {
        Ok(step)
    } else {
        Err(PlumeError::configuration(
            name,
            "axis spacing is not uniform",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK: [f64; 2] = [0.0, 1.0];

    fn axes(x: &[f64], y: &[f64], z: &[f64]) -> Result<SpatialGrid> {
        SpatialGrid::new(x.to_vec(), y.to_vec(), z.to_vec())
    }

    #[test]
    fn test_linspace_matches_endpoints() {
        let axis = linspace_axis(-51.0, 49.0, 21);
        assert_eq!(axis.len(), 21);
        assert_eq!(axis[0], -51.0);
        assert_eq!(axis[20], 49.0);
        assert!((axis[1] - axis[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_axes() {
        assert!(axes(&[0.0], &OK, &OK).is_err());
        assert!(axes(&OK, &[1.0, 0.0], &OK).is_err());
        assert!(axes(&OK, &OK, &[0.0, 0.0]).is_err());
        assert!(axes(&OK, &OK, &[0.0, f64::NAN]).is_err());
        assert!(axes(&OK, &OK, &OK).is_ok());
    }

    #[test]
    fn test_index_round_trip() {
        let grid =
            SpatialGrid::from_linspace((0.0, 4.0, 5), (0.0, 2.0, 3), (0.0, 1.0, 2)).unwrap();
        assert_eq!(grid.cell_count(), 30);
        assert_eq!(grid.cell_index(0, 0, 1), 1);
        assert_eq!(grid.cell_index(0, 1, 0), 2);
        assert_eq!(grid.cell_index(1, 0, 0), 6);
        for idx in 0..grid.cell_count() {
            let (ix, iy, iz) = grid.cell_coords(idx);
            assert_eq!(grid.cell_index(ix, iy, iz), idx);
        }
    }

    #[test]
    fn test_uniform_steps_detects_irregular_axes() {
        let grid = SpatialGrid::from_linspace(
            (-200.0, 200.0, 41),
            (-200.0, 200.0, 41),
            (0.0, 10.0, 11),
        )
        .unwrap();
        let (dx, dy, dz) = grid.uniform_steps().unwrap();
        assert!((dx - 10.0).abs() < 1e-9);
        assert!((dy - 10.0).abs() < 1e-9);
        assert!((dz - 1.0).abs() < 1e-9);

        let irregular = axes(&[0.0, 1.0, 3.0], &OK, &OK).unwrap();
        assert!(irregular.uniform_steps().is_err());
    }
}
