//! Error types for the client
//!
//! Centralized error handling using thiserror. The variants follow the
//! failure taxonomy of a streaming call: transport, application, decode and
//! sink failures are kept apart so callers can tell them from each other.

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level error reported by the server, either as a whole body or
/// as a single line of a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: i32,

    #[serde(rename = "error", default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

fn is_zero(code: &i32) -> bool {
    *code == 0
}

impl ErrorResponse {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Any code at or above 400 marks a failed operation
    pub fn is_failure(&self) -> bool {
        self.code >= 400
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = u16::try_from(self.code)
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status");

        if self.message.is_empty() {
            write!(f, "{} {}", self.code, reason)
        } else {
            write!(f, "{} {}: {}", self.code, reason, self.message)
        }
    }
}

impl std::error::Error for ErrorResponse {}

/// Error returned by an event sink to stop a stream early.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// All error types that can occur while talking to the server
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection could not be established or was interrupted
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server reported a failure
    #[error("{0}")]
    Api(ErrorResponse),

    /// A body or stream line was not well-formed for its expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request body could not be serialized
    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// The event consumer aborted the stream
    #[error("Aborted by consumer: {0}")]
    Sink(#[source] SinkError),

    /// Host string could not be turned into a base URL
    #[error("Invalid host: {0}")]
    InvalidHost(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ErrorResponse> for ClientError {
    fn from(err: ErrorResponse) -> Self {
        ClientError::Api(err)
    }
}

impl ClientError {
    /// Status code of an application error, if this is one
    pub fn status_code(&self) -> Option<i32> {
        match self {
            ClientError::Api(resp) => Some(resp.code),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, ClientError::Decode(_))
    }

    pub fn is_sink(&self) -> bool {
        matches!(self, ClientError::Sink(_))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
