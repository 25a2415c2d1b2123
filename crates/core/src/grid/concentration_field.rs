//! Dense 3D concentration field aligned to a [`SpatialGrid`]
//!
//! Values are in ppm and share the grid's z-fastest layout. A field only records the
//! mesh dimensions, not the coordinates, so a simulation history of many fields does
//! not copy the grid.

use super::spatial_grid::SpatialGrid;
use crate::error::{PlumeError, Result};
use serde::{Deserialize, Serialize};

/// Concentration (ppm) at every mesh point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationField {
    nx: usize,
    ny: usize,
    nz: usize,
    values: Vec<f64>,
}

impl ConcentrationField {
    /// All-zero field for `grid`
    pub fn zeros(grid: &SpatialGrid) -> Self {
        Self::uniform(grid, 0.0)
    }

    /// Field with the same value everywhere
    pub fn uniform(grid: &SpatialGrid, value: f64) -> Self {
        let (nx, ny, nz) = grid.dims();
        Self {
            nx,
            ny,
            nz,
            values: vec![value; nx * ny * nz],
        }
    }

    /// Wrap values laid out as `(ix * ny + iy) * nz + iz`.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if the length does not match the grid.
    pub fn from_values(grid: &SpatialGrid, values: Vec<f64>) -> Result<Self> {
        let (nx, ny, nz) = grid.dims();
        if values.len() != nx * ny * nz {
            return Err(PlumeError::configuration(
                "concentration",
                format!("{} values for a {nx}x{ny}x{nz} grid", values.len()),
            ));
        }
        Ok(Self { nx, ny, nz, values })
    }

    /// Mesh dimensions `(nx, ny, nz)`
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// Flat values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at mesh point `(ix, iy, iz)`, `None` outside the mesh
    pub fn get(&self, ix: usize, iy: usize, iz: usize) -> Option<f64> {
        if ix < self.nx && iy < self.ny && iz < self.nz {
            Some(self.values[(ix * self.ny + iy) * self.nz + iz])
        } else {
            None
        }
    }

    /// Largest value in the field
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Sum over all mesh points
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Every value multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            nx: self.nx,
            ny: self.ny,
            nz: self.nz,
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }

    /// Pointwise sum, e.g. for superposing independent leaks.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if the dimensions differ.
    pub fn added(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Pointwise `self - other`.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if the dimensions differ.
    pub fn difference(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Trilinear interpolation at fractional mesh indices.
    ///
    /// Points outside `[0, n-1]` on any axis read as zero (no gas outside the mesh).
    pub fn sample_index_space(&self, fx: f64, fy: f64, fz: f64) -> f64 {
        let (Some((ix0, ix1, tx)), Some((iy0, iy1, ty)), Some((iz0, iz1, tz))) = (
            bracket(fx, self.nx),
            bracket(fy, self.ny),
            bracket(fz, self.nz),
        ) else {
            return 0.0;
        };

        let v = |ix: usize, iy: usize, iz: usize| self.values[(ix * self.ny + iy) * self.nz + iz];

        let c00 = lerp(v(ix0, iy0, iz0), v(ix1, iy0, iz0), tx);
        let c10 = lerp(v(ix0, iy1, iz0), v(ix1, iy1, iz0), tx);
        let c01 = lerp(v(ix0, iy0, iz1), v(ix1, iy0, iz1), tx);
        let c11 = lerp(v(ix0, iy1, iz1), v(ix1, iy1, iz1), tx);

        let c0 = lerp(c00, c10, ty);
        let c1 = lerp(c01, c11, ty);
        lerp(c0, c1, tz)
    }

    fn zip_with(&self, other: &Self, op: impl Fn(f64, f64) -> f64) -> Result<Self> {
        if self.dims() != other.dims() {
            return Err(PlumeError::configuration(
                "concentration",
                format!(
                    "field dimensions differ: {:?} vs {:?}",
                    self.dims(),
                    other.dims()
                ),
            ));
        }
        Ok(Self {
            nx: self.nx,
            ny: self.ny,
            nz: self.nz,
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(&a, &b)| op(a, b))
                .collect(),
        })
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Lower/upper neighbour and fraction for coordinate `f` on an axis of `n` points.
fn bracket(f: f64, n: usize) -> Option<(usize, usize, f64)> {
    let last = (n - 1) as f64;
    if !(0.0..=last).contains(&f) {
        return None;
    }
    let i0 = (f.floor() as usize).min(n - 2);
    Some((i0, i0 + 1, f - i0 as f64))
}
