//! Camera pose and sightline sampling.
//!
//! Each reduced-resolution pixel looks along a fixed direction of the pixel fan.
//! Sightlines are traced in grid-index space: the camera location is converted to
//! fractional indices, the far endpoint lies `horizontal_range` metres away
//! horizontally (`vertical_range` vertically) expressed in whole grid steps, and the
//! field is sampled at evenly spaced points in between.
//!
//! ```text
//! end = start + (fx·cos h·sin v, fy·sin h·sin v, fz·cos v)
//! fx = ⌊500/dx⌋, fy = ⌊500/dy⌋, fz = ⌊100/dz⌋
//! CPL = mean(samples) × horizontal_range
//! ```

use super::radiometry::SensorConfig;
use crate::core_types::vec3::Vec3;
use crate::error::{PlumeError, Result};
use crate::grid::{linspace_axis, ConcentrationField, SpatialGrid};
use serde::{Deserialize, Serialize};

/// Camera location and viewing direction (unit length).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    location: Vec3,
    aim: Vec3,
}

impl CameraPose {
    /// Camera at `location` looking along `aim`.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Domain`] if `aim` has zero length or either vector is
    /// not finite.
    pub fn new(location: Vec3, aim: Vec3) -> Result<Self> {
        if !location.iter().all(|v| v.is_finite()) {
            return Err(PlumeError::domain(
                "camera_location",
                format!("non-finite location {location:?}"),
            ));
        }
        let norm = aim.norm();
        if !(norm.is_finite() && norm > 0.0) {
            return Err(PlumeError::domain(
                "camera_aim",
                format!("aim vector {aim:?} cannot be normalized"),
            ));
        }
        Ok(Self {
            location,
            aim: aim / norm,
        })
    }

    /// Camera at `location` looking towards `target`.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Domain`] if `target` coincides with `location`.
    pub fn looking_at(location: Vec3, target: Vec3) -> Result<Self> {
        Self::new(location, target - location)
    }

    /// Camera position (m)
    pub fn location(&self) -> Vec3 {
        self.location
    }

    /// Unit viewing direction
    pub fn aim(&self) -> Vec3 {
        self.aim
    }

    /// `(horizontal, vertical)` pointing angles in radians.
    ///
    /// Horizontal is the azimuth from +x, vertical is measured down from +z.
    pub fn pointing_angles(&self) -> (f64, f64) {
        let horizontal = self.aim.y.atan2(self.aim.x);
        let vertical = self.aim.z.clamp(-1.0, 1.0).acos();
        (horizontal, vertical)
    }
}

impl Default for CameraPose {
    /// Camera at the origin looking along (1, 1, 1).
    fn default() -> Self {
        let aim = Vec3::new(1.0, 1.0, 1.0);
        Self {
            location: Vec3::zeros(),
            aim: aim / aim.norm(),
        }
    }
}

/// Angles of every reduced-resolution pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelFan {
    /// Horizontal angle per column (rad)
    pub horizontal: Vec<f64>,
    /// Vertical angle per row (rad)
    pub vertical: Vec<f64>,
}

impl PixelFan {
    /// Spread the sensor's field of view evenly around the pose's pointing direction.
    pub fn new(pose: &CameraPose, sensor: &SensorConfig) -> Self {
        let (h, v) = pose.pointing_angles();
        let dh = sensor.half_fov_horizontal();
        let dv = sensor.half_fov_vertical();
        Self {
            horizontal: linspace_axis(h - dh, h + dh, sensor.reduced_columns),
            vertical: linspace_axis(v - dv, v + dv, sensor.reduced_rows),
        }
    }

    /// Number of pixels in the fan
    pub fn len(&self) -> usize {
        self.horizontal.len() * self.vertical.len()
    }

    /// True if the fan has no pixels
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(horizontal, vertical)` angles of flat pixel index `idx` (column-major).
    pub fn angles(&self, idx: usize) -> (f64, f64) {
        let rows = self.vertical.len();
        (self.horizontal[idx / rows], self.vertical[idx % rows])
    }
}

/// Sightline tracer of one pose on one grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SightlineSampler {
    start: Vec3,
    reach: Vec3,
    samples: usize,
    path_length: f64,
}

impl SightlineSampler {
    /// Prepare sightlines from `pose` through `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if the grid axes are not uniformly spaced.
    pub fn new(grid: &SpatialGrid, pose: &CameraPose, sensor: &SensorConfig) -> Result<Self> {
        let (dx, dy, dz) = grid.uniform_steps()?;
        let (x0, y0, z0) = grid.origin();
        let loc = pose.location();

        Ok(Self {
            start: Vec3::new((loc.x - x0) / dx, (loc.y - y0) / dy, (loc.z - z0) / dz),
            reach: Vec3::new(
                (sensor.horizontal_range / dx).trunc(),
                (sensor.horizontal_range / dy).trunc(),
                (sensor.vertical_range / dz).trunc(),
            ),
            samples: sensor.path_samples,
            path_length: sensor.horizontal_range,
        })
    }

    /// Camera location in fractional grid indices
    pub fn start(&self) -> Vec3 {
        self.start
    }

    /// Far endpoint of the sightline at `(horizontal, vertical)`, in grid indices.
    pub fn endpoint(&self, horizontal: f64, vertical: f64) -> Vec3 {
        let (sin_v, cos_v) = vertical.sin_cos();
        self.start
            + Vec3::new(
                self.reach.x * horizontal.cos() * sin_v,
                self.reach.y * horizontal.sin() * sin_v,
                self.reach.z * cos_v,
            )
    }

    /// Mean field value along the sightline to `end`.
    ///
    /// Samples falling outside the mesh count as zero.
    pub fn path_average(&self, field: &ConcentrationField, end: Vec3) -> f64 {
        let step = (end - self.start) / (self.samples - 1) as f64;
        let sum: f64 = (0..self.samples)
            .map(|i| {
                let p = self.start + step * i as f64;
                field.sample_index_space(p.x, p.y, p.z)
            })
            .sum();
        sum / self.samples as f64
    }

    /// Concentration-pathlength (ppm·m) of the pixel at `(horizontal, vertical)`.
    pub fn concentration_pathlength(
        &self,
        field: &ConcentrationField,
        horizontal: f64,
        vertical: f64,
    ) -> f64 {
        self.path_average(field, self.endpoint(horizontal, vertical)) * self.path_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn default_grid() -> SpatialGrid {
        SpatialGrid::from_linspace(
            (-200.0, 200.0, 41),
            (-200.0, 200.0, 41),
            (0.0, 10.0, 11),
        )
        .unwrap()
    }

    fn default_sampler(grid: &SpatialGrid) -> Result<SightlineSampler> {
        SightlineSampler::new(grid, &CameraPose::default(), &SensorConfig::default())
    }

    #[test]
    fn test_zero_aim_is_domain_error() {
        assert!(matches!(
            CameraPose::new(Vec3::zeros(), Vec3::zeros()),
            Err(PlumeError::Domain { quantity: "camera_aim", .. })
        ));
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(CameraPose::looking_at(p, p).is_err());
        assert!(CameraPose::new(Vec3::new(f64::NAN, 0.0, 0.0), Vec3::x()).is_err());
    }

    #[test]
    fn test_looking_at_subtracts_location() {
        let location = Vec3::new(10.0, 0.0, 0.0);
        let pose = CameraPose::looking_at(location, Vec3::new(10.0, 5.0, 0.0)).unwrap();
        assert_relative_eq!(pose.aim(), Vec3::y());
    }

    #[test]
    fn test_default_pointing_angles() {
        let (h, v) = CameraPose::default().pointing_angles();
        assert_relative_eq!(h, FRAC_PI_4);
        assert_relative_eq!(v, (1.0 / 3.0_f64.sqrt()).acos());
    }

    #[test]
    fn test_fan_spans_field_of_view() {
        let fan = PixelFan::new(&CameraPose::default(), &SensorConfig::default());
        assert_eq!(fan.len(), 4800);
        let (h, v) = CameraPose::default().pointing_angles();
        assert_relative_eq!(fan.horizontal[0], h - PI / 15.0, epsilon = 1e-12);
        assert_relative_eq!(fan.horizontal[79], h + PI / 15.0, epsilon = 1e-12);
        assert_relative_eq!(fan.vertical[59], v + PI / 20.0, epsilon = 1e-12);
        assert_eq!(fan.angles(61), (fan.horizontal[1], fan.vertical[1]));
    }

    #[test]
    fn test_sampler_works_in_index_space() {
        let sampler = default_sampler(&default_grid()).unwrap();
        assert_relative_eq!(sampler.start(), Vec3::new(20.0, 20.0, 0.0));

        // Straight up: fz = 100 / 1 steps
        let end = sampler.endpoint(0.0, 0.0);
        assert_relative_eq!(end, Vec3::new(20.0, 20.0, 100.0), epsilon = 1e-12);
        // Horizontal along +x: fx = 500 / 10 steps
        let end = sampler.endpoint(0.0, FRAC_PI_2);
        assert_relative_eq!(end, Vec3::new(70.0, 20.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_path_average_counts_outside_as_zero() {
        let grid = default_grid();
        let field = ConcentrationField::uniform(&grid, 10.0);
        let sampler = default_sampler(&grid).unwrap();

        // Along +x at ground level, indices 20..=70; only 20..=40 lie on the mesh
        let end = sampler.endpoint(0.0, FRAC_PI_2);
        let inside = (0..201)
            .filter(|i| 20.0 + 50.0 * f64::from(*i) / 200.0 <= 40.0)
            .count();
        let expected = 10.0 * inside as f64 / 201.0;
        assert_relative_eq!(sampler.path_average(&field, end), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_non_uniform_grid_rejected() {
        let ok = vec![0.0, 1.0];
        let grid = SpatialGrid::new(vec![0.0, 1.0, 3.0], ok.clone(), ok).unwrap();
        assert!(default_sampler(&grid).is_err());
    }
}
