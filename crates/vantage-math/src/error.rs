//! Error types for the numerical kernels.

use thiserror::Error;

/// Result alias for numerical operations.
pub type MathResult<T> = Result<T, MathError>;

/// Failures of the linear algebra and statistics kernels.
///
/// A covariance matrix that is not positive semidefinite is not an error;
/// see [`crate::linear_algebra::Decomposition`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// Operand shapes do not line up.
    #[error("shape mismatch: {left:?} against {right:?}")]
    ShapeMismatch {
        /// (rows, cols) of the left operand.
        left: (usize, usize),
        /// (rows, cols) of the right operand.
        right: (usize, usize),
    },

    /// A row-major buffer does not fill the requested shape.
    #[error("buffer holds {actual} values, shape needs {expected}")]
    BufferLength {
        /// rows × cols.
        expected: usize,
        /// Buffer length supplied.
        actual: usize,
    },

    /// Observation columns differ in length.
    #[error("ragged observations: expected {expected} per column, found {actual}")]
    RaggedColumns {
        /// Length of the first column.
        expected: usize,
        /// Length of the offending column.
        actual: usize,
    },

    /// Operation requires a square matrix.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Too few observations.
    #[error("need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum required.
        required: usize,
        /// Supplied.
        actual: usize,
    },

    /// Values outside the kernel's domain (non-finite, non-positive prices).
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong.
        reason: String,
    },
}

impl MathError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }
}
