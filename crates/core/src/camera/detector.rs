//! Binary leak detection from one concentration field.

use super::geometry::{CameraPose, PixelFan, SightlineSampler};
use super::radiometry::{RadiometricTerms, SceneTemperatures, SensorConfig};
use crate::constants::{GasProperties, PhysicalConstants};
use crate::error::{PlumeError, Result};
use crate::grid::{ConcentrationField, SpatialGrid};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of one detection query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Whether the rescaled pixel count reached the threshold
    pub detected: bool,
    /// Triggered pixels of the reduced image
    pub triggered_pixels: usize,
    /// Estimated triggered pixels at full resolution
    pub full_resolution_pixels: usize,
}

impl DetectionResult {
    /// Detection as `1` / `0`
    pub fn as_flag(&self) -> u8 {
        u8::from(self.detected)
    }
}

/// IR camera detector with precomputed radiometric terms.
///
/// The noise floor and contrast depend only on the sensor and temperatures, so one
/// detector can evaluate any number of poses and fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDetector {
    sensor: SensorConfig,
    terms: RadiometricTerms,
    constants: PhysicalConstants,
    gas: GasProperties,
}

impl CameraDetector {
    /// Build a detector and compute its radiometric terms.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if the sensor parameters are invalid.
    pub fn new(
        sensor: SensorConfig,
        temperatures: SceneTemperatures,
        constants: PhysicalConstants,
        gas: GasProperties,
    ) -> Result<Self> {
        sensor.validate()?;
        let terms = RadiometricTerms::compute(&sensor, &temperatures, &constants);
        debug!(
            "Camera radiometry: nep={:.4e} W, tec={:.4e} W, trigger fraction {:.4}",
            terms.nep,
            terms.tec,
            terms.trigger_fraction()
        );
        Ok(Self {
            sensor,
            terms,
            constants,
            gas,
        })
    }

    /// Detector with default sensor, 300 K scene, standard constants and methane.
    ///
    /// # Errors
    ///
    /// See [`CameraDetector::new`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            SensorConfig::default(),
            SceneTemperatures::default(),
            PhysicalConstants::STANDARD,
            GasProperties::METHANE,
        )
    }

    /// Sensor parameters
    pub fn sensor(&self) -> &SensorConfig {
        &self.sensor
    }

    /// Precomputed noise floor and contrast
    pub fn radiometric_terms(&self) -> RadiometricTerms {
        self.terms
    }

    /// Optical attenuation of a concentration-pathlength (ppm·m).
    pub fn attenuation(&self, cpl: f64) -> f64 {
        cpl * self.gas.absorption_coefficient * self.constants.avogadro * 1e-4
    }

    /// Image contrast of a pixel with concentration-pathlength `cpl` (W).
    pub fn contrast(&self, cpl: f64) -> f64 {
        let absorbed = 1.0 - 10f64.powf(-self.attenuation(cpl));
        absorbed * self.terms.tec.abs() * self.sensor.air_transmission
    }

    /// Count triggered pixels for one pose and decide on detection.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if the field does not match the grid or
    /// the grid is not uniformly spaced.
    pub fn detect(
        &self,
        field: &ConcentrationField,
        grid: &SpatialGrid,
        pose: &CameraPose,
    ) -> Result<DetectionResult> {
        if field.dims() != grid.dims() {
            return Err(PlumeError::configuration(
                "concentration",
                format!(
                    "field {:?} does not match grid {:?}",
                    field.dims(),
                    grid.dims()
                ),
            ));
        }
        let sampler = SightlineSampler::new(grid, pose, &self.sensor)?;
        let fan = PixelFan::new(pose, &self.sensor);

        let triggered_pixels = (0..fan.len())
            .into_par_iter()
            .filter(|&idx| {
                let (h, v) = fan.angles(idx);
                self.contrast(sampler.concentration_pathlength(field, h, v)) >= self.terms.nep
            })
            .count();

        let full_resolution_pixels = triggered_pixels * self.sensor.resolution_scale;
        let detected = full_resolution_pixels >= self.sensor.detection_threshold;

        debug!(
            "Camera at ({:.1}, {:.1}, {:.1}): {}/{} pixels triggered ({} full-res), detected={}",
            pose.location().x,
            pose.location().y,
            pose.location().z,
            triggered_pixels,
            fan.len(),
            full_resolution_pixels,
            detected
        );

        Ok(DetectionResult {
            detected,
            triggered_pixels,
            full_resolution_pixels,
        })
    }

    /// Evaluate several poses against the same field.
    ///
    /// # Errors
    ///
    /// See [`CameraDetector::detect`]; the first failing pose aborts the batch.
    pub fn detect_many(
        &self,
        field: &ConcentrationField,
        grid: &SpatialGrid,
        poses: &[CameraPose],
    ) -> Result<Vec<DetectionResult>> {
        poses
            .iter()
            .map(|pose| self.detect(field, grid, pose))
            .collect()
    }
}
