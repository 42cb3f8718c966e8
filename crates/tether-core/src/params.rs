//! Solver parameters forwarded to the native step.

/// Parameters controlling one native simulation step.
///
/// The host layer only validates and forwards these; their meaning is
/// defined by the native solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntegrationParameters {
    /// Timestep length in seconds. Default: 1/60.
    pub dt: f32,
    /// Velocity-solver iterations per step. Default: 4.
    pub num_solver_iterations: usize,
    /// Internal PGS iterations per solver iteration. Default: 1.
    pub num_internal_pgs_iterations: usize,
    /// Upper bound on CCD substeps. Default: 1.
    pub max_ccd_substeps: usize,
}

impl IntegrationParameters {
    /// Default timestep: 60 Hz.
    pub const DEFAULT_DT: f32 = 1.0 / 60.0;

    /// Parameters with the given timestep and defaults elsewhere.
    pub fn with_dt(dt: f32) -> Self {
        Self {
            dt,
            ..Self::default()
        }
    }

    /// Inverse of the timestep, or zero when `dt` is zero.
    pub fn inv_dt(&self) -> f32 {
        if self.dt == 0.0 {
            0.0
        } else {
            1.0 / self.dt
        }
    }
}

impl Default for IntegrationParameters {
    fn default() -> Self {
        Self {
            dt: Self::DEFAULT_DT,
            num_solver_iterations: 4,
            num_internal_pgs_iterations: 1,
            max_ccd_substeps: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_sixty_hz() {
        let p = IntegrationParameters::default();
        assert!((p.inv_dt() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn zero_dt_has_zero_inverse() {
        assert_eq!(IntegrationParameters::with_dt(0.0).inv_dt(), 0.0);
    }
}
