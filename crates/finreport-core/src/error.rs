//! Error types for the analysis calculators.

use thiserror::Error;

/// A specialized Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur while computing return statistics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Fewer observations than the calculation needs.
    #[error("Insufficient data: need at least {required} data points, got {actual}")]
    InsufficientData {
        /// Minimum required points.
        required: usize,
        /// Actual number of points.
        actual: usize,
    },

    /// A denominator was zero, so the result would be infinite or undefined.
    #[error("Division by zero: {context}")]
    DivisionByZero {
        /// What was being divided.
        context: String,
    },

    /// Invalid input value.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl AnalysisError {
    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Creates a division by zero error.
    #[must_use]
    pub fn division_by_zero(context: impl Into<String>) -> Self {
        Self::DivisionByZero {
            context: context.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable tag for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InsufficientData { .. } => "insufficient_data",
            AnalysisError::DivisionByZero { .. } => "division_by_zero",
            AnalysisError::InvalidInput { .. } => "invalid_input",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::insufficient_data(2, 1);
        assert!(err.to_string().contains("at least 2"));
        assert!(err.to_string().contains("got 1"));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            AnalysisError::division_by_zero("zero volatility").kind(),
            "division_by_zero"
        );
        assert_eq!(AnalysisError::invalid_input("NaN").kind(), "invalid_input");
    }
}
