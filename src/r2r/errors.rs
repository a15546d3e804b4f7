//! R2R client error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. They stay typed
//! inside the client; the tool dispatcher turns them into envelope text at the
//! outermost boundary.

use thiserror::Error;

/// Errors that can occur while talking to the R2R service.
#[derive(Debug, Error)]
pub enum R2rError {
    /// TCP/HTTP connection to the R2R endpoint failed.
    #[error("request to {endpoint} failed: {reason}")]
    Transport {
        endpoint: String,
        reason: String,
    },

    /// Non-2xx HTTP response. Status and body are kept verbatim.
    #[error("R2R API error: {status} - {body}")]
    RemoteRejection {
        status: u16,
        body: String,
    },

    /// A required argument combination was not supplied.
    #[error("{reason}")]
    MissingArgument {
        reason: String,
    },

    /// Arguments were supplied but cannot be used together.
    #[error("{reason}")]
    InvalidArgument {
        reason: String,
    },

    /// A local file named in the arguments does not exist.
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
    },

    /// Any other local I/O failure while preparing a request.
    #[error("failed to read {path}: {reason}")]
    Io {
        path: String,
        reason: String,
    },

    /// A 2xx response whose body does not have the expected shape.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        endpoint: String,
        reason: String,
    },

    /// Read error while draining a streamed response body.
    #[error("stream error: {reason}")]
    Stream {
        reason: String,
    },
}

impl R2rError {
    /// HTTP status of a remote rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            R2rError::RemoteRejection { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn transport(endpoint: &str, err: reqwest::Error) -> Self {
        R2rError::Transport {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn malformed(endpoint: &str, reason: impl std::fmt::Display) -> Self {
        R2rError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }
}
