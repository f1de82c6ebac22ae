//! LUT error types.

use thiserror::Error;

/// Result type for LUT operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors that can occur while reading, validating or packing a LUT.
#[derive(Debug, Error)]
pub enum LutError {
    /// Grid resolution outside `2..=MAX_SIZE`.
    #[error("invalid LUT size {0}: expected between 2 and {max} samples per axis", max = crate::MAX_SIZE)]
    InvalidSize(usize),

    /// Sample count does not match `size^3`.
    #[error("expected {expected} samples for a LUT of size {size}, found {found}")]
    SampleCount {
        /// Grid resolution.
        size: usize,
        /// `size^3`.
        expected: usize,
        /// Number of samples actually present.
        found: usize,
    },

    /// Structural problem in a `.cube` file.
    #[error("format error: {0}")]
    Format(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
