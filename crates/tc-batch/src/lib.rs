//! tc-batch: comfort evaluation over climate time series.
//!
//! Provides:
//! - `ClimateSeries`: parallel per-timestep arrays with single-value broadcasting
//! - `ComfortCriteria`: what counts as a comfortable timestep
//! - `BatchEvaluator`: sequential or rayon-parallel evaluation with
//!   cooperative cancellation, progress events and optional balance
//!   temperatures

pub mod criteria;
pub mod error;
pub mod evaluator;
pub mod progress;
pub mod series;

pub use criteria::ComfortCriteria;
pub use error::{BatchError, BatchResult};
pub use evaluator::{BatchEvaluator, BatchOptions, BatchOutput, CancelToken};
pub use progress::{BatchProgressEvent, BatchStage};
pub use series::ClimateSeries;
