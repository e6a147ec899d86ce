//! Batch evaluation errors.

use tc_comfort::ModelError;
use tc_core::TcError;
use thiserror::Error;

pub type BatchResult<T> = Result<T, BatchError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    /// The cancel token was raised during comfort evaluation; partial results
    /// are discarded.
    #[error("Cancelled after {completed} of {total} timesteps")]
    Cancelled { completed: usize, total: usize },

    #[error("Series '{what}' has {found} values, expected 1 or {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Empty series: {what}")]
    Empty { what: &'static str },

    #[error("Hour index {index} outside series of length {len}")]
    HourOutOfRange { index: usize, len: usize },

    #[error("Invalid input at timestep {index}: {source}")]
    InvalidInput { index: usize, source: TcError },

    #[error("Invalid comfort criteria: {0}")]
    InvalidCriteria(TcError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

impl From<BatchError> for TcError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Cancelled { .. } => TcError::Cancelled {
                what: "batch evaluation",
            },
            BatchError::LengthMismatch { what, .. } => TcError::InvalidArg { what },
            BatchError::Empty { what } => TcError::InvalidArg { what },
            BatchError::HourOutOfRange { .. } => TcError::InvalidArg {
                what: "hour index outside series",
            },
            BatchError::InvalidInput { source, .. } => source,
            BatchError::InvalidCriteria(inner) => inner,
            BatchError::Model(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BatchError::LengthMismatch {
            what: "relative humidity",
            expected: 24,
            found: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("relative humidity"));
        assert!(msg.contains("24"));
    }

    #[test]
    fn cancelled_maps_to_tc_error() {
        let err: TcError = BatchError::Cancelled {
            completed: 3,
            total: 10,
        }
        .into();
        assert!(matches!(err, TcError::Cancelled { .. }));
    }
}
