//! Error types for the Kiln client

use std::path::PathBuf;
use std::time::Duration;

use kiln_core::{DeliveryError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Kiln client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Parameters do not satisfy the recipe schema; nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Invalid request, rejected before anything was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The machine did not report the job as created before the deadline
    #[error("job {job_id} was not created within {waited:?}")]
    Timeout {
        /// Job that was being waited on
        job_id: String,
        /// How long the client waited
        waited: Duration,
    },

    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status} {reason}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        reason: String,
        /// Response body
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The response was well-formed but cannot be used
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Local file could not be read or written during a transfer
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        /// Local file being read or written
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification of a [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Timeout,
    Transport,
    Protocol,
    Io,
}

impl ClientError {
    /// Create an API error from status code, reason phrase and body
    pub fn api_error(status: u16, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            reason: reason.into(),
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidRequest(_) => ErrorKind::Validation,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::RequestFailed(_) | Self::ApiError { .. } | Self::ParseError(_) => {
                ErrorKind::Transport
            }
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Check if this error came from the network or a non-2xx response
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

impl From<DeliveryError> for ClientError {
    fn from(err: DeliveryError) -> Self {
        Self::Protocol(err.to_string())
    }
}
