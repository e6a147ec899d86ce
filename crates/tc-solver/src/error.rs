//! Error types for solver operations.

use tc_core::error::TcError;
use thiserror::Error;

/// Errors that can occur while solving scalar equations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// The method ran out of iterations or hit a singular step.
    #[error("Unsolved by {method}: {what}")]
    Unsolved {
        method: &'static str,
        what: &'static str,
    },

    /// Bisection found no sign change around the midpoint.
    #[error("No sign change in bracket [{a}, {b}]")]
    NoSignChange { a: f64, b: f64 },

    #[error("Convergence failed: {what} after {iterations} iterations")]
    ConvergenceFailed {
        what: &'static str,
        iterations: usize,
    },

    #[error("Non-finite value in {what}")]
    NonFinite { what: &'static str },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// True for every failure that means "no answer within the budget".
    pub fn is_non_convergence(&self) -> bool {
        !matches!(self, SolverError::InvalidArg { .. })
    }
}

impl From<SolverError> for TcError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::InvalidArg { what } => TcError::InvalidArg { what },
            SolverError::Unsolved { what, .. } => TcError::NonConvergence { what },
            SolverError::NoSignChange { .. } => TcError::NonConvergence {
                what: "no sign change in bracket",
            },
            SolverError::ConvergenceFailed { what, .. } => TcError::NonConvergence { what },
            SolverError::NonFinite { what } => TcError::NonFinite {
                what,
                value: f64::NAN,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SolverError::Unsolved {
            method: "secant",
            what: "zero slope",
        };
        let msg = err.to_string();
        assert!(msg.contains("secant"));
        assert!(msg.contains("zero slope"));
    }

    #[test]
    fn error_conversion() {
        let tc_err: TcError = SolverError::NoSignChange { a: -1.0, b: 1.0 }.into();
        assert!(matches!(tc_err, TcError::NonConvergence { .. }));

        let tc_err: TcError = SolverError::InvalidArg { what: "epsilon" }.into();
        assert!(matches!(tc_err, TcError::InvalidArg { what: "epsilon" }));
    }

    #[test]
    fn invalid_arg_is_not_non_convergence() {
        assert!(!SolverError::InvalidArg { what: "x" }.is_non_convergence());
        assert!(
            SolverError::ConvergenceFailed {
                what: "x",
                iterations: 3
            }
            .is_non_convergence()
        );
    }
}
