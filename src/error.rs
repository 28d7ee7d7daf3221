//! Error types for spectral repair operations.

use thiserror::Error;

/// Result type for repair operations.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors that can occur during a spectral repair step.
#[derive(Debug, Error)]
pub enum RepairError {
    /// Input matrices or mask have inconsistent shapes.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Dimension mismatch between related inputs.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// The Laplacian kernel spans the whole spectrum, so no harmonic
    /// vector with a strictly positive eigenvalue exists.
    #[error(
        "degenerate spectrum: kernel dimension {kernel_dim} of {dim}, no spectral gap to ascend"
    )]
    DegenerateSpectrum {
        /// Number of near-zero eigenvalues.
        kernel_dim: usize,
        /// Dimension of the Laplacian.
        dim: usize,
    },

    /// NaN or infinity produced during the computation.
    #[error("numeric instability: {0}")]
    NumericInstability(String),

    /// Invalid hyperparameter configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RepairError {
    /// Create an invalid shape error.
    #[must_use]
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    /// Create a dimension mismatch error.
    #[must_use]
    pub fn dim_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create a numeric instability error.
    #[must_use]
    pub fn unstable(msg: impl Into<String>) -> Self {
        Self::NumericInstability(msg.into())
    }
}
