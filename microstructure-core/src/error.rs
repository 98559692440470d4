use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures raised by the metric and hypothesis routines.
///
/// Every variant is a deterministic numeric or shape condition detected at the
/// point of computation. None of them are retried and no partial result is
/// returned alongside them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MicrostructureError {
    #[error("Insufficient data for {operation}: required {required}, found {found}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        found: usize,
    },

    #[error("Division by zero computing {quantity} at {timestamp}: total volume is zero")]
    DivisionByZero {
        timestamp: DateTime<Utc>,
        quantity: &'static str,
    },

    #[error("Invalid Roll estimate: price change autocovariance is {covariance}, must be negative")]
    InvalidEstimate { covariance: f64 },

    #[error("Duplicate snapshot timestamp: {0}")]
    DuplicateTimestamp(DateTime<Utc>),

    #[error("Series mismatch: {left} points vs {right} points on different timestamps")]
    SeriesMismatch { left: usize, right: usize },
}

impl MicrostructureError {
    /// Shorthand for the "not enough points" case
    pub fn insufficient(operation: &'static str, required: usize, found: usize) -> Self {
        MicrostructureError::InsufficientData {
            operation,
            required,
            found,
        }
    }
}

pub type Result<T> = std::result::Result<T, MicrostructureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = MicrostructureError::insufficient("martingale evaluation", 2, 1);
        assert_eq!(
            err.to_string(),
            "Insufficient data for martingale evaluation: required 2, found 1"
        );
    }

    #[test]
    fn test_invalid_estimate_message() {
        let err = MicrostructureError::InvalidEstimate { covariance: 0.25 };
        assert!(err.to_string().contains("0.25"));
        assert!(err.to_string().contains("must be negative"));
    }
}
