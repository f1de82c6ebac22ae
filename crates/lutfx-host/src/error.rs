//! Host pipeline error types.

use lutfx_graph::GraphError;
use lutfx_lut::LutError;
use thiserror::Error;

/// Result type for host pipelines.
pub type HostResult<T> = Result<T, HostError>;

/// Errors raised by export and import.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host is not in a state the operation can run in.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Invalid LUT data or `.cube` syntax.
    #[error(transparent)]
    Lut(LutError),

    /// Invalid node graph.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The host failed to create, attach or evaluate a resource.
    #[error("host resource error: {0}")]
    Resource(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cancelled through the progress callback.
    #[error("operation cancelled")]
    Cancelled,
}

impl From<LutError> for HostError {
    fn from(e: LutError) -> Self {
        match e {
            LutError::Io(io) => HostError::Io(io),
            other => HostError::Lut(other),
        }
    }
}
