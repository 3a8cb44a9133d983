//! Error types for trace aggregation

use thiserror::Error;

/// Structural problems in node-execution input.
///
/// Missing optional fields inside a node are not errors; they leave the
/// corresponding output absent.
#[derive(Error, Debug)]
pub enum TraceError {
    /// Input document has the wrong shape
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A node entry could not be read
    #[error("Invalid node at index {index}: {message}")]
    InvalidNode { index: usize, message: String },

    /// Output document could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TraceError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        TraceError::InvalidInput(msg.into())
    }
}

impl From<serde_json::Error> for TraceError {
    fn from(err: serde_json::Error) -> Self {
        TraceError::Serialization(err.to_string())
    }
}

/// Result type alias for trace operations
pub type Result<T> = std::result::Result<T, TraceError>;
