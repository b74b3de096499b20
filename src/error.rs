use thiserror::Error;

use crate::types::MessageHandle;

/// Result alias used across the client
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised by the chat client
#[derive(Debug, Error)]
pub enum ClientError {
    /// One or more generation parameters are out of range
    #[error("Invalid generation parameters: {}", .0.join(" "))]
    Validation(Vec<String>),

    /// Network failure or non-2xx response
    #[error("Request to {endpoint} failed: {message}")]
    Transport {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// The backend acknowledged a cancellation instead of completing
    #[error("Generation cancelled")]
    Cancelled,

    /// Rejected locally before any request was attempted
    #[error("{0}")]
    InputGuard(String),

    #[error("Configuration error for {parameter}: {message}")]
    Configuration { parameter: String, message: String },

    #[error("Unknown transcript message {0:?}")]
    UnknownMessage(MessageHandle),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn transport(endpoint: impl Into<String>, error: reqwest::Error) -> Self {
        ClientError::Transport {
            endpoint: endpoint.into(),
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }

    pub(crate) fn configuration(parameter: &str, message: impl Into<String>) -> Self {
        ClientError::Configuration {
            parameter: parameter.to_string(),
            message: message.into(),
        }
    }
}

/// Classification helpers for reporting decisions
pub(crate) trait ErrorExt {
    fn is_cancellation(&self) -> bool;
}

impl ErrorExt for ClientError {
    fn is_cancellation(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}
