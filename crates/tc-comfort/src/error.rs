//! Comfort model errors.

use tc_core::TcError;
use tc_solver::SolverError;
use thiserror::Error;

/// Result type for comfort model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while evaluating comfort models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A bounded iterative loop ran out of iterations.
    #[error("Did not converge: {what} after {iterations} iterations")]
    NonConvergence {
        what: &'static str,
        iterations: usize,
    },

    /// Input rejected before reaching the models.
    #[error("Invalid input: {0}")]
    InvalidInput(TcError),

    /// Activity name without a tabulated metabolic rate.
    #[error("Unknown activity: {name}")]
    UnknownActivity { name: String },

    /// Root finding failed inside the elevated air speed correction.
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

impl ModelError {
    /// True when the failure is a numerical non-convergence rather than bad input.
    pub fn is_non_convergence(&self) -> bool {
        match self {
            ModelError::NonConvergence { .. } => true,
            ModelError::Solver(e) => e.is_non_convergence(),
            ModelError::InvalidInput(_) | ModelError::UnknownActivity { .. } => false,
        }
    }
}

impl From<ModelError> for TcError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NonConvergence { what, .. } => TcError::NonConvergence { what },
            ModelError::InvalidInput(inner) => inner,
            ModelError::UnknownActivity { .. } => TcError::InvalidArg {
                what: "unknown activity",
            },
            ModelError::Solver(e) => e.into(),
        }
    }
}
