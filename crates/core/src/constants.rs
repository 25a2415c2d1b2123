//! Physical constant tables
//!
//! Radiometric and buoyancy calculations take these tables by reference instead of
//! reading scattered literals, so a different gas or a different set of reference
//! constants can be substituted without touching the models.

use serde::{Deserialize, Serialize};

/// Universal physical constants (SI units).
///
/// The values match the precision used by the empirical camera calibration
/// (e.g. `c = 3e8`), not CODATA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Planck's constant (J·s)
    pub planck: f64,
    /// Stefan-Boltzmann constant (W/m²·K⁴)
    pub stefan_boltzmann: f64,
    /// Speed of light (m/s)
    pub speed_of_light: f64,
    /// Boltzmann's constant (J/K)
    pub boltzmann: f64,
    /// Avogadro's number (1/mol)
    pub avogadro: f64,
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
}

impl PhysicalConstants {
    /// Reference constant table used by all defaults.
    pub const STANDARD: PhysicalConstants = PhysicalConstants {
        planck: 6.626e-34,
        stefan_boltzmann: 5.67e-8,
        speed_of_light: 3e8,
        boltzmann: 1.38e-23,
        avogadro: 6.023e23,
        gravity: 9.8,
    };
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Properties of the released gas and the surrounding air.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasProperties {
    /// Gas density used by the buoyancy term (same scale as `air_density`)
    pub density: f64,
    /// Air density used by the buoyancy term
    pub air_density: f64,
    /// Mass-fraction to ppm divisor (`ppm = conc · 1e6 / ppm_conversion`)
    pub ppm_conversion: f64,
    /// Band-averaged infrared absorption coefficient
    pub absorption_coefficient: f64,
}

impl GasProperties {
    /// Methane in air.
    pub const METHANE: GasProperties = GasProperties {
        density: 681.0,
        air_density: 1225.0,
        ppm_conversion: 656.0,
        absorption_coefficient: 2.191e-20,
    };

    /// Convert a mass-fraction concentration to parts per million.
    #[inline]
    pub fn to_ppm(&self, concentration: f64) -> f64 {
        concentration * 1e6 / self.ppm_conversion
    }
}

impl Default for GasProperties {
    fn default() -> Self {
        Self::METHANE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methane_is_lighter_than_air() {
        let gas = GasProperties::METHANE;
        assert!(gas.density < gas.air_density);
    }

    #[test]
    fn test_ppm_conversion() {
        let gas = GasProperties::METHANE;
        assert!((gas.to_ppm(656e-6) - 1.0).abs() < 1e-12);
    }
}
