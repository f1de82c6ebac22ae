//! Graph error types.

use thiserror::Error;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur while validating or evaluating a node graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A link or lookup references a node id that does not exist.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// Two nodes share the same id.
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// A link references a port the operator does not have.
    #[error("node '{node}' has no {direction} port {port}")]
    InvalidPort {
        /// Node id.
        node: String,
        /// Port index.
        port: usize,
        /// "input" or "output".
        direction: &'static str,
    },

    /// More than one link drives the same input port.
    #[error("input {port} of node '{node}' is linked more than once")]
    InputConflict {
        /// Node id.
        node: String,
        /// Port index.
        port: usize,
    },

    /// The links form a cycle.
    #[error("graph contains a cycle through node '{0}'")]
    Cycle(String),

    /// A value of the wrong kind reached an input.
    #[error("node '{node}' expected {expected} on input {port}")]
    TypeMismatch {
        /// Node id.
        node: String,
        /// Port index.
        port: usize,
        /// Expected value kind.
        expected: &'static str,
    },

    /// An image node references a texture that was not supplied.
    #[error("texture not found: {0}")]
    MissingTexture(String),

    /// The color space converter cannot handle a pair of spaces.
    #[error("unsupported color space conversion: '{from}' -> '{to}'")]
    UnsupportedConversion {
        /// Source space.
        from: String,
        /// Target space.
        to: String,
    },

    /// The graph has no group output node.
    #[error("graph has no output node")]
    NoOutput,
}
