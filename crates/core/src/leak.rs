//! Leak source description.
//!
//! A single leak sits at the origin of the horizontal plane at `height` metres above
//! ground. Its buoyancy factor drives the plume-rise term of the puff model:
//!
//! ```text
//! F = g · rate · (1/π) · (1/ρ_gas − 1/ρ_air)
//! ```

use crate::constants::{GasProperties, PhysicalConstants};
use crate::error::{PlumeError, Result};
use serde::{Deserialize, Serialize};

/// How the leak releases gas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LeakKind {
    /// Sustained release at the emission rate.
    Continuous,
    /// Single bounded release; `size` replaces the rate as the puff source strength.
    Event {
        /// Released amount (g)
        size: f64,
    },
}

/// Immutable leak parameters with the derived buoyancy factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeakDescriptor {
    emission_rate: f64,
    height: f64,
    kind: LeakKind,
    buoyancy_factor: f64,
}

impl LeakDescriptor {
    /// Build a leak with the standard constants and methane properties.
    ///
    /// `event_size` selects the discrete-event variant.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] if any value is negative or non-finite.
    pub fn build(emission_rate: f64, height: f64, event_size: Option<f64>) -> Result<Self> {
        Self::with_properties(
            emission_rate,
            height,
            event_size,
            &PhysicalConstants::STANDARD,
            &GasProperties::METHANE,
        )
    }

    /// Sustained leak of `emission_rate` g/s at `height` m.
    ///
    /// # Errors
    ///
    /// See [`LeakDescriptor::build`].
    pub fn continuous(emission_rate: f64, height: f64) -> Result<Self> {
        Self::build(emission_rate, height, None)
    }

    /// Bounded release of `size` g from a leak of `emission_rate` g/s.
    ///
    /// # Errors
    ///
    /// See [`LeakDescriptor::build`].
    pub fn event(emission_rate: f64, height: f64, size: f64) -> Result<Self> {
        Self::build(emission_rate, height, Some(size))
    }

    /// Build a leak against explicit constant tables.
    ///
    /// # Errors
    ///
    /// See [`LeakDescriptor::build`].
    pub fn with_properties(
        emission_rate: f64,
        height: f64,
        event_size: Option<f64>,
        constants: &PhysicalConstants,
        gas: &GasProperties,
    ) -> Result<Self> {
        let emission_rate = require_non_negative("emission_rate", emission_rate)?;
        let height = require_non_negative("height", height)?;
        let kind = match event_size {
            Some(size) => LeakKind::Event {
                size: require_non_negative("event_size", size)?,
            },
            None => LeakKind::Continuous,
        };

        let buoyancy_factor = constants.gravity
            * emission_rate
            * std::f64::consts::FRAC_1_PI
            * (1.0 / gas.density - 1.0 / gas.air_density);

        Ok(Self {
            emission_rate,
            height,
            kind,
            buoyancy_factor,
        })
    }

    /// Emission rate (g/s)
    pub fn emission_rate(&self) -> f64 {
        self.emission_rate
    }

    /// Release height above ground (m)
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Release variant
    pub fn kind(&self) -> LeakKind {
        self.kind
    }

    /// Buoyancy factor used by the plume-rise term
    pub fn buoyancy_factor(&self) -> f64 {
        self.buoyancy_factor
    }

    /// Source strength `Q` of the puff normalization: the rate for a continuous leak,
    /// the event size for a bounded release.
    pub fn source_strength(&self) -> f64 {
        match self.kind {
            LeakKind::Continuous => self.emission_rate,
            LeakKind::Event { size } => size,
        }
    }
}

fn require_non_negative(parameter: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PlumeError::configuration(
            parameter,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buoyancy_factor_from_rate() {
        let leak = LeakDescriptor::continuous(1.0, 2.01).unwrap();
        let expected = 9.8 / std::f64::consts::PI * (1.0 / 681.0 - 1.0 / 1225.0);
        assert!((leak.buoyancy_factor() - expected).abs() < 1e-15);
        assert!(leak.buoyancy_factor() > 0.0);
    }

    #[test]
    fn test_variants_share_buoyancy_but_not_strength() {
        let cont = LeakDescriptor::continuous(1.0, 2.0).unwrap();
        let event = LeakDescriptor::event(1.0, 2.0, 30.0).unwrap();
        assert_eq!(cont.buoyancy_factor(), event.buoyancy_factor());
        assert_eq!(cont.source_strength(), 1.0);
        assert_eq!(event.source_strength(), 30.0);
        assert_eq!(event.kind(), LeakKind::Event { size: 30.0 });
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(LeakDescriptor::continuous(-1.0, 2.0).is_err());
        assert!(LeakDescriptor::continuous(1.0, f64::NAN).is_err());
        assert!(LeakDescriptor::event(1.0, 2.0, -5.0).is_err());
    }

    #[test]
    fn test_alternate_gas_changes_buoyancy() {
        let heavy = GasProperties {
            density: 2000.0,
            ..GasProperties::METHANE
        };
        let constants = PhysicalConstants::STANDARD;
        let leak = LeakDescriptor::with_properties(1.0, 2.0, None, &constants, &heavy).unwrap();
        assert!(leak.buoyancy_factor() < 0.0);
    }
}
