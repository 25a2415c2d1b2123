//! Error types for the plume simulation core
//!
//! Two failure classes cross function boundaries:
//! - **Configuration**: the inputs describe an impossible setup (time step larger than
//!   the simulated period, non-monotonic coordinate arrays, non-uniform camera grid, ...)
//! - **Domain**: a physical quantity is outside the range the model is defined on
//!   (calm wind in the plume-rise denominator, zero-length aim vectors, non-finite input)
//!
//! Degenerate cells (plume origin, zero dispersion) and non-converged quadrature are
//! recovered locally and only reported through [`crate::dispersion::FieldStats`].

use thiserror::Error;

/// Errors raised by the plume simulation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlumeError {
    /// Invalid simulation setup.
    #[error("invalid configuration for {parameter}: {message}")]
    Configuration {
        /// Name of the offending parameter (e.g. `"time_step"`, `"x"`)
        parameter: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// A physical quantity outside the model's domain.
    #[error("domain error for {quantity}: {message}")]
    Domain {
        /// Name of the offending quantity (e.g. `"wind_speed"`, `"camera_aim"`)
        quantity: &'static str,
        /// What is wrong with it
        message: String,
    },
}

impl PlumeError {
    /// Create a configuration error for `parameter`.
    pub fn configuration(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            parameter,
            message: message.into(),
        }
    }

    /// Create a domain error for `quantity`.
    pub fn domain(quantity: &'static str, message: impl Into<String>) -> Self {
        Self::Domain {
            quantity,
            message: message.into(),
        }
    }

    /// Check that `value` is finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns [`PlumeError::Configuration`] naming `parameter` otherwise.
    pub fn require_positive(parameter: &'static str, value: f64) -> Result<f64> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Self::configuration(
                parameter,
                format!("must be finite and positive, got {value}"),
            ))
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlumeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_parameter() {
        let err = PlumeError::configuration("time_step", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid configuration for time_step: must be positive"
        );

        let err = PlumeError::domain("wind_speed", "calm wind");
        assert_eq!(err.to_string(), "domain error for wind_speed: calm wind");
    }

    #[test]
    fn test_require_positive_rejects_zero_and_nan() {
        assert_eq!(PlumeError::require_positive("dx", 2.5), Ok(2.5));
        assert!(PlumeError::require_positive("dx", 0.0).is_err());
        assert!(PlumeError::require_positive("dx", -1.0).is_err());
        assert!(PlumeError::require_positive("dx", f64::NAN).is_err());
        assert!(PlumeError::require_positive("dx", f64::INFINITY).is_err());
    }
}
