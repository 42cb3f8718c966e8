//! World configuration and validation.
//!
//! [`WorldConfig`] is the builder-input for a [`World`](crate::World).
//! [`validate()`](WorldConfig::validate) runs at construction and again
//! whenever gravity or the timestep is changed.

use std::error::Error;
use std::fmt;

use tether_core::{Dim, IntegrationParameters, Packed, Vect};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`WorldConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `dt` is NaN, infinite, zero, or negative.
    InvalidTimestep {
        /// The invalid value.
        value: f32,
    },
    /// `num_solver_iterations` is zero.
    InvalidSolverIterations,
    /// A gravity component is NaN or infinite.
    NonFiniteGravity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimestep { value } => {
                write!(f, "timestep must be finite and positive, got {value}")
            }
            Self::InvalidSolverIterations => {
                write!(f, "at least one solver iteration is required")
            }
            Self::NonFiniteGravity => write!(f, "gravity must be finite"),
        }
    }
}

impl Error for ConfigError {}

// ── WorldConfig ────────────────────────────────────────────────────

/// Construction parameters for a [`World`](crate::World).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig<D: Dim> {
    /// World gravity. Default: zero.
    pub gravity: Vect<D>,
    /// Solver parameters forwarded to every step.
    pub integration: IntegrationParameters,
}

impl<D: Dim> Default for WorldConfig<D> {
    fn default() -> Self {
        Self {
            gravity: Default::default(),
            integration: IntegrationParameters::default(),
        }
    }
}

impl<D: Dim> WorldConfig<D> {
    /// Default parameters with the given gravity.
    pub fn with_gravity(gravity: Vect<D>) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dt = self.integration.dt;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ConfigError::InvalidTimestep { value: dt });
        }
        if self.integration.num_solver_iterations == 0 {
            return Err(ConfigError::InvalidSolverIterations);
        }
        if !self.gravity.all_finite() {
            return Err(ConfigError::NonFiniteGravity);
        }
        Ok(())
    }
}
