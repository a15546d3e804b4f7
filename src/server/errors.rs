//! MCP server error types.

use thiserror::Error;

/// Errors that end the serve loop.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Reading from the input channel failed.
    #[error("failed to read request: {reason}")]
    Read {
        reason: String,
    },

    /// Writing or flushing the output channel failed.
    #[error("failed to write response: {reason}")]
    Write {
        reason: String,
    },

    /// A response could not be serialized.
    #[error("failed to serialize response: {reason}")]
    Serialize {
        reason: String,
    },
}
