//! Bounded scalar fixed-point iteration.
//!
//! Iterates `x <- x + step(x)` until `|step(x)| <= tolerance`. The final
//! correction is applied before returning, so the returned value is the
//! point *after* the last (small) step.

use crate::error::SolverError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fixed-point iteration configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPointConfig {
    /// Stop once the correction is no larger than this
    pub tolerance: f64,
    /// Maximum number of corrections
    pub max_iterations: usize,
}

impl Default for FixedPointConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            max_iterations: 100,
        }
    }
}

/// Fixed-point iteration result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPointResult {
    /// Converged value
    pub value: f64,
    /// Number of step evaluations
    pub iterations: usize,
    /// Last correction applied
    pub last_step: f64,
}

/// Run `x <- x + step(x)` from `x0` until the correction is within tolerance.
pub fn iterate_fixed_point<F, E>(
    x0: f64,
    mut step: F,
    config: &FixedPointConfig,
) -> Result<FixedPointResult, E>
where
    F: FnMut(f64) -> Result<f64, E>,
    E: From<SolverError>,
{
    if !(config.tolerance > 0.0) {
        return Err(SolverError::InvalidArg {
            what: "tolerance must be positive",
        }
        .into());
    }

    let mut x = x0;
    for iteration in 1..=config.max_iterations {
        let delta = step(x)?;
        if !delta.is_finite() {
            return Err(SolverError::NonFinite {
                what: "fixed-point correction",
            }
            .into());
        }
        x += delta;

        if delta.abs() <= config.tolerance {
            debug!(value = x, iterations = iteration, "fixed point converged");
            return Ok(FixedPointResult {
                value: x,
                iterations: iteration,
                last_step: delta,
            });
        }
    }

    warn!(
        last_value = x,
        max_iterations = config.max_iterations,
        "fixed-point iteration did not converge"
    );
    Err(SolverError::ConvergenceFailed {
        what: "fixed-point iteration",
        iterations: config.max_iterations,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverResult;

    #[test]
    fn contraction_converges() {
        // x <- x + 0.5 * (3 - x) has fixed point 3
        let result = iterate_fixed_point(
            10.0,
            |x| -> SolverResult<f64> { Ok(0.5 * (3.0 - x)) },
            &FixedPointConfig::default(),
        )
        .unwrap();
        assert!((result.value - 3.0).abs() < 0.02);
        assert!(result.last_step.abs() <= 0.01);
    }

    #[test]
    fn exact_start_takes_one_evaluation() {
        let result = iterate_fixed_point(
            3.0,
            |x| -> SolverResult<f64> { Ok(3.0 - x) },
            &FixedPointConfig::default(),
        )
        .unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.value, 3.0);
    }

    #[test]
    fn oscillation_hits_iteration_cap() {
        // x <- x + (-2x) flips sign forever
        let config = FixedPointConfig {
            tolerance: 0.01,
            max_iterations: 25,
        };
        let err = iterate_fixed_point(1.0, |x| -> SolverResult<f64> { Ok(-2.0 * x) }, &config)
            .unwrap_err();
        assert_eq!(
            err,
            SolverError::ConvergenceFailed {
                what: "fixed-point iteration",
                iterations: 25
            }
        );
    }

    #[test]
    fn non_finite_step_is_rejected() {
        let err = iterate_fixed_point(
            1.0,
            |_x| -> SolverResult<f64> { Ok(f64::NAN) },
            &FixedPointConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::NonFinite { .. }));
    }
}
