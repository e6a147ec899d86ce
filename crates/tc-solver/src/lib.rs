//! Scalar solvers used by the comfort models.
//!
//! This crate provides the one-dimensional root finders (secant with a
//! bisection fallback) used by the elevated air speed correction, and a
//! bounded fixed-point iterator used by the comfort envelope searches.
//! Every iteration is capped; running out of iterations is reported as an
//! error, never as a sentinel value.

pub mod error;
pub mod fixed_point;
pub mod root;

pub use error::{SolverError, SolverResult};
pub use fixed_point::{FixedPointConfig, FixedPointResult, iterate_fixed_point};
pub use root::{RootConfig, RootMethod, RootResult, bisect, find_root, secant};
