//! Radiometric sensor model.
//!
//! Produces the two scalars the detector compares against: the per-pixel noise
//! floor (`nep`) and the plume/background temperature-emissivity contrast (`tec`).
//! Both depend only on the sensor and the scene temperatures, never on the camera
//! pose, so they are computed once per detector.
//!
//! # Scientific Background
//!
//! With nondimensional band limits `w = h·c / (λ·k·T)` the in-band fraction of
//! blackbody emission is
//!
//! ```text
//! frac(T) = ∫_{w1}^{w2} x³ / (eˣ − 1) dx / (π⁴/15)
//! ```
//!
//! and the power collected by one pixel is
//! `(4/π) · σT⁴ · A_d · tan(FoV_h/2) · tan(FoV_v/2) · frac(T)`.
//!
//! The noise floor uses the closed-form antiderivative of `x³ e^{−x}` (the leading
//! term of the Planck series) scaled by NETD, pixel area and f-number.

use crate::constants::PhysicalConstants;
use crate::core_types::units::{Degrees, Kelvin};
use crate::error::{PlumeError, Result};
use crate::solver::{integrate, QuadratureConfig};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Difference between ground and ambient-air temperature (K).
pub const AMBIENT_TEMPERATURE_OFFSET: f64 = 20.0;

/// Camera sensor and scene-proxy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Short-wavelength band edge (m)
    pub band_lower: f64,
    /// Long-wavelength band edge (m)
    pub band_upper: f64,
    /// Full horizontal field of view
    pub fov_horizontal: Degrees,
    /// Full vertical field of view
    pub fov_vertical: Degrees,
    /// Detector pixel area (m²)
    pub pixel_area: f64,
    /// Noise-equivalent temperature difference (K)
    pub netd: f64,
    /// Optics focal ratio
    pub f_number: f64,
    /// Ground emissivity
    pub ground_emissivity: f64,
    /// Air emissivity
    pub air_emissivity: f64,
    /// Transmission of the air column
    pub air_transmission: f64,
    /// Horizontal pixel count of the reduced image
    pub reduced_columns: usize,
    /// Vertical pixel count of the reduced image
    pub reduced_rows: usize,
    /// Full-resolution pixels represented by one reduced pixel
    pub resolution_scale: usize,
    /// Full-resolution triggered pixels needed for a detection
    pub detection_threshold: usize,
    /// Horizontal range beyond which nothing is seen (m); also the ray length used
    /// for the concentration-pathlength
    pub horizontal_range: f64,
    /// Vertical range of a sightline (m)
    pub vertical_range: f64,
    /// Samples along each sightline
    pub path_samples: usize,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            band_lower: 3.2e-6,
            band_upper: 3.4e-6,
            fov_horizontal: Degrees::new(24.0),
            fov_vertical: Degrees::new(18.0),
            pixel_area: 9e-10,
            netd: 0.015,
            f_number: 1.5,
            ground_emissivity: 0.5,
            air_emissivity: 0.1,
            air_transmission: 1.0,
            reduced_columns: 80,
            reduced_rows: 60,
            resolution_scale: 16,
            detection_threshold: 400,
            horizontal_range: 500.0,
            vertical_range: 100.0,
            path_samples: 201,
        }
    }
}

impl SensorConfig {
    /// Check the sensor parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] for non-positive physical parameters, an
    /// empty or inverted band, an empty image or fewer than two path samples.
    pub fn validate(&self) -> Result<()> {
        PlumeError::require_positive("band_lower", self.band_lower)?;
        PlumeError::require_positive("band_upper", self.band_upper)?;
        if self.band_upper <= self.band_lower {
            return Err(PlumeError::configuration(
                "band_upper",
                format!("band [{}, {}] m is empty", self.band_lower, self.band_upper),
            ));
        }
        PlumeError::require_positive("fov_horizontal", self.fov_horizontal.value())?;
        PlumeError::require_positive("fov_vertical", self.fov_vertical.value())?;
        PlumeError::require_positive("pixel_area", self.pixel_area)?;
        PlumeError::require_positive("netd", self.netd)?;
        PlumeError::require_positive("f_number", self.f_number)?;
        PlumeError::require_positive("horizontal_range", self.horizontal_range)?;
        PlumeError::require_positive("vertical_range", self.vertical_range)?;
        if self.reduced_columns == 0 || self.reduced_rows == 0 {
            return Err(PlumeError::configuration(
                "reduced_columns",
                "reduced image must have at least one pixel",
            ));
        }
        if self.path_samples < 2 {
            return Err(PlumeError::configuration(
                "path_samples",
                format!("need at least 2 samples, got {}", self.path_samples),
            ));
        }
        Ok(())
    }

    /// Half of the horizontal field of view (rad)
    pub fn half_fov_horizontal(&self) -> f64 {
        0.5 * self.fov_horizontal.to_radians().value()
    }

    /// Half of the vertical field of view (rad)
    pub fn half_fov_vertical(&self) -> f64 {
        0.5 * self.fov_vertical.to_radians().value()
    }

    /// Pixels in the reduced image
    pub fn reduced_pixel_count(&self) -> usize {
        self.reduced_columns * self.reduced_rows
    }
}

/// Scene temperatures seen by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneTemperatures {
    /// Ground (background) temperature
    pub ground: Kelvin,
    /// Gas plume temperature
    pub plume: Kelvin,
    /// Ambient air temperature
    pub ambient: Kelvin,
}

impl Default for SceneTemperatures {
    fn default() -> Self {
        Self {
            ground: Kelvin::new(300.0),
            plume: Kelvin::new(300.0),
            ambient: Kelvin::new(300.0 - AMBIENT_TEMPERATURE_OFFSET),
        }
    }
}

impl SceneTemperatures {
    /// Temperatures with the ambient air 20 K below the ground.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Domain`] if the ambient temperature would not be positive.
    pub fn new(ground: Kelvin, plume: Kelvin) -> Result<Self> {
        let ambient = ground.value() - AMBIENT_TEMPERATURE_OFFSET;
        if ambient <= 0.0 || !ambient.is_finite() {
            return Err(PlumeError::domain(
                "ground_temperature",
                format!("{ground} leaves no positive ambient temperature"),
            ));
        }
        Ok(Self {
            ground,
            plume,
            ambient: Kelvin::new(ambient),
        })
    }
}

/// Noise floor and contrast of one sensor/scene combination (W).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiometricTerms {
    /// Noise-equivalent power
    pub nep: f64,
    /// Temperature-emissivity contrast
    pub tec: f64,
}

impl RadiometricTerms {
    /// Compute both terms.
    ///
    /// The three pixel powers are independent and are evaluated in parallel.
    pub fn compute(
        sensor: &SensorConfig,
        temperatures: &SceneTemperatures,
        constants: &PhysicalConstants,
    ) -> Self {
        let quadrature = QuadratureConfig::default();
        let power = |t: Kelvin| pixel_power(sensor, constants, t, &quadrature);

        let (ground_t, ambient_t) = (temperatures.ground, temperatures.ambient);
        let (plume, (ground, ambient)) = rayon::join(
            || power(temperatures.plume),
            || rayon::join(|| power(ground_t), || power(ambient_t)),
        );

        let e_g = sensor.ground_emissivity;
        let e_a = sensor.air_emissivity;
        let tec = plume - e_g * ground - e_a * (1.0 - e_g) * ambient;

        Self {
            nep: noise_equivalent_power(sensor, constants, temperatures.ground),
            tec,
        }
    }

    /// Fraction of the full contrast a pixel must reach to trigger (`nep / |tec|`).
    ///
    /// Values ≥ 1 mean no concentration can ever be detected.
    pub fn trigger_fraction(&self) -> f64 {
        self.nep / self.tec.abs()
    }
}

/// Nondimensional band limits `(w1, w2)` at `temperature`, `w1 < w2`.
pub fn band_limits(
    sensor: &SensorConfig,
    constants: &PhysicalConstants,
    temperature: Kelvin,
) -> (f64, f64) {
    let kt = constants.boltzmann * temperature.value();
    let hc_k = constants.planck * constants.speed_of_light / kt;
    (hc_k / sensor.band_upper, hc_k / sensor.band_lower)
}

/// Power reaching one pixel from a blackbody filling the field of view (W).
pub fn pixel_power(
    sensor: &SensorConfig,
    constants: &PhysicalConstants,
    temperature: Kelvin,
    quadrature: &QuadratureConfig,
) -> f64 {
    let (w1, w2) = band_limits(sensor, constants, temperature);
    let band = integrate(|x: f64| x.powi(3) / x.exp_m1(), w1, w2, quadrature);
    let fraction = band.value / (PI.powi(4) / 15.0);

    let emitted = constants.stefan_boltzmann * temperature.value().powi(4) * sensor.pixel_area;
    let geometry = (4.0 / PI)
        * (0.5 * sensor.fov_horizontal.to_radians().value()).tan()
        * (0.5 * sensor.fov_vertical.to_radians().value()).tan();
    emitted * geometry * fraction
}

/// Noise-equivalent power of one pixel against a background at `ground` (W).
pub fn noise_equivalent_power(
    sensor: &SensorConfig,
    constants: &PhysicalConstants,
    ground: Kelvin,
) -> f64 {
    let t = ground.value();
    let (w1, w2) = band_limits(sensor, constants, ground);
    let n1 = 2.0 * PI * constants.boltzmann.powi(4) * t.powi(3)
        / (constants.planck.powi(3) * constants.speed_of_light.powi(2));
    let band = (antiderivative(w2) - antiderivative(w1)) * n1;
    band * sensor.netd * sensor.pixel_area / (4.0 * sensor.f_number.powi(2))
}

/// `−e^{−w}·(720 + 720w + 360w² + 120w³ + 30w⁴ + 6w⁵ + w⁶)`
fn antiderivative(w: f64) -> f64 {
    let poly = 720.0 + w * (720.0 + w * (360.0 + w * (120.0 + w * (30.0 + w * (6.0 + w)))));
    -(-w).exp() * poly
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn terms() -> RadiometricTerms {
        RadiometricTerms::compute(
            &SensorConfig::default(),
            &SceneTemperatures::default(),
            &PhysicalConstants::STANDARD,
        )
    }

    #[test]
    fn test_default_terms_regression() {
        let t = terms();
        assert_relative_eq!(t.nep, 1.4197e-12, max_relative = 1e-3);
        assert_relative_eq!(t.tec, 1.7324e-12, max_relative = 1e-3);
        assert_relative_eq!(t.trigger_fraction(), 0.8195, max_relative = 1e-3);
    }

    #[test]
    fn test_pixel_power_at_300k() {
        let p = pixel_power(
            &SensorConfig::default(),
            &PhysicalConstants::STANDARD,
            Kelvin::new(300.0),
            &QuadratureConfig::default(),
        );
        assert_relative_eq!(p, 3.5923e-12, max_relative = 1e-3);
    }

    #[test]
    fn test_pixel_power_grows_with_temperature() {
        let sensor = SensorConfig::default();
        let q = QuadratureConfig::default();
        let c = PhysicalConstants::STANDARD;
        let cold = pixel_power(&sensor, &c, Kelvin::new(280.0), &q);
        let warm = pixel_power(&sensor, &c, Kelvin::new(320.0), &q);
        assert!(warm > cold, "warm={warm:e} cold={cold:e}");
    }

    #[test]
    fn test_band_limits_are_ordered() {
        let (w1, w2) = band_limits(
            &SensorConfig::default(),
            &PhysicalConstants::STANDARD,
            Kelvin::new(300.0),
        );
        assert!(w1 < w2);
        assert_relative_eq!(w1, 14.122, max_relative = 1e-3);
    }

    #[test]
    fn test_ambient_follows_ground() {
        let temps = SceneTemperatures::new(Kelvin::new(310.0), Kelvin::new(305.0)).unwrap();
        assert_eq!(temps.ambient.value(), 290.0);
        assert!(SceneTemperatures::new(Kelvin::new(15.0), Kelvin::new(300.0)).is_err());
    }

    #[test]
    fn test_invalid_sensor_rejected() {
        assert!(SensorConfig::default().validate().is_ok());
        let inverted = SensorConfig {
            band_lower: 3.4e-6,
            band_upper: 3.2e-6,
            ..SensorConfig::default()
        };
        assert!(inverted.validate().is_err());
        let no_samples = SensorConfig {
            path_samples: 1,
            ..SensorConfig::default()
        };
        assert!(no_samples.validate().is_err());
    }
}
