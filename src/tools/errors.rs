//! Tool dispatch error types.

use thiserror::Error;

use crate::r2r::R2rError;

/// Errors raised while dispatching a tool call.
///
/// Only `UnknownTool` leaves the dispatcher as an `Err`; everything else is
/// rendered into an error envelope for the caller.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool name is not in the catalog.
    #[error("Unknown tool: {name}")]
    UnknownTool {
        name: String,
    },

    /// Arguments are missing, mistyped or outside an enum.
    #[error("invalid arguments for '{tool}': {reason}")]
    InvalidArguments {
        tool: String,
        reason: String,
    },

    /// The R2R call itself failed.
    #[error(transparent)]
    Remote(#[from] R2rError),
}
