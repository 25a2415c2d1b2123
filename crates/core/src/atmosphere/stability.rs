//! Atmospheric stability classes for puff dispersion.
//!
//! Wind speed is binned into four discrete stability classes, each carrying the
//! empirical coefficients of the dispersion-curve power laws used by the puff engine:
//!
//! ```text
//! sigma_y = k · X / (1 + X/a)^p
//! sigma_z = l · X / (1 + X/a)^q
//! ```
//!
//! # Scientific Background
//!
//! Low wind speeds allow buoyant, convective mixing (wide, fast-growing plumes);
//! higher wind speeds suppress it. The coefficient rows are empirical fits, not
//! derived from first principles.

use crate::error::{PlumeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete stability class, from most convective (A) to most neutral (D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StabilityClass {
    /// wind < 2 m/s
    A,
    /// 2 ≤ wind < 5 m/s
    B,
    /// 5 ≤ wind < 6 m/s
    C,
    /// wind ≥ 6 m/s
    D,
}

impl StabilityClass {
    /// All classes in table order.
    pub const ALL: [StabilityClass; 4] = [
        StabilityClass::A,
        StabilityClass::B,
        StabilityClass::C,
        StabilityClass::D,
    ];

    /// Bin a wind speed (m/s). Thresholds are exclusive upper bounds, so 2, 5 and 6
    /// land in B, C and D respectively.
    pub fn from_wind_speed(wind_speed: f64) -> Self {
        if wind_speed < 2.0 {
            StabilityClass::A
        } else if wind_speed < 5.0 {
            StabilityClass::B
        } else if wind_speed < 6.0 {
            StabilityClass::C
        } else {
            StabilityClass::D
        }
    }

    /// Row index into [`DISPERSION_TABLE`].
    pub fn index(self) -> usize {
        match self {
            StabilityClass::A => 0,
            StabilityClass::B => 1,
            StabilityClass::C => 2,
            StabilityClass::D => 3,
        }
    }

    /// Dispersion coefficients for this class.
    pub fn coefficients(self) -> DispersionCoefficients {
        DISPERSION_TABLE[self.index()]
    }
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StabilityClass::A => "A",
            StabilityClass::B => "B",
            StabilityClass::C => "C",
            StabilityClass::D => "D",
        };
        write!(f, "{name}")
    }
}

/// Coefficient quintuple of the dispersion power laws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispersionCoefficients {
    /// Length scale of the power-law roll-off (m)
    pub a: f64,
    /// Vertical spread coefficient
    pub l: f64,
    /// Vertical roll-off exponent
    pub q: f64,
    /// Horizontal spread coefficient
    pub k: f64,
    /// Horizontal roll-off exponent
    pub p: f64,
}

/// Empirical coefficient table.
///
/// The fifth row belongs to a stable (night-time) class that the wind-speed binning
/// never selects; it is kept so the table matches its published source.
pub const DISPERSION_TABLE: [DispersionCoefficients; 5] = [
    DispersionCoefficients {
        a: 927.0,
        l: 0.102,
        q: -1.918,
        k: 0.25,
        p: 0.189,
    },
    DispersionCoefficients {
        a: 370.0,
        l: 0.0962,
        q: -0.101,
        k: 0.202,
        p: 0.162,
    },
    DispersionCoefficients {
        a: 283.0,
        l: 0.0722,
        q: 0.102,
        k: 0.134,
        p: 0.134,
    },
    DispersionCoefficients {
        a: 707.0,
        l: 0.0475,
        q: 0.465,
        k: 0.0787,
        p: 0.135,
    },
    DispersionCoefficients {
        a: 1070.0,
        l: 0.0335,
        q: 0.624,
        k: 0.0566,
        p: 0.137,
    },
];

/// Atmospheric state for one wind sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereState {
    /// Stability class selected from the wind speed
    pub stability_class: StabilityClass,
    /// Dispersion coefficients of that class
    pub coefficients: DispersionCoefficients,
}

impl AtmosphereState {
    /// Classify a wind speed sample.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Domain`] if `wind_speed` is not finite.
    pub fn classify(wind_speed: f64) -> Result<Self> {
        if !wind_speed.is_finite() {
            return Err(PlumeError::domain(
                "wind_speed",
                format!("must be a finite number, got {wind_speed}"),
            ));
        }
        Ok(Self::for_class(StabilityClass::from_wind_speed(wind_speed)))
    }

    /// Atmosphere for an explicit class.
    pub fn for_class(stability_class: StabilityClass) -> Self {
        Self {
            stability_class,
            coefficients: stability_class.coefficients(),
        }
    }

    /// Horizontal (crosswind) dispersion at downwind distance `x` (m).
    #[inline]
    pub fn sigma_y(&self, x: f64) -> f64 {
        let c = &self.coefficients;
        c.k * x / (1.0 + x / c.a).powf(c.p)
    }

    /// Vertical dispersion at downwind distance `x` (m).
    #[inline]
    pub fn sigma_z(&self, x: f64) -> f64 {
        let c = &self.coefficients;
        c.l * x / (1.0 + x / c.a).powf(c.q)
    }
}
