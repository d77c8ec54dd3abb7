//! Transport failures.
//!
//! The store reports all of these identically; the variants exist for logs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Base URL could not be used to build request URLs
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request never produced a response
    #[error("Connection to '{url}' failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded the configured timeout
    #[error("Request timeout after {duration}s")]
    Timeout { duration: u64 },

    /// Server answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("Malformed response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::InvalidUrl { .. } => "invalid_url",
            TransportError::Client(_) => "client_error",
            TransportError::Connection { .. } => "connection_error",
            TransportError::Timeout { .. } => "timeout",
            TransportError::Status { .. } => "status_error",
            TransportError::Body(_) => "body_error",
            TransportError::Decode(_) => "decode_error",
        }
    }
}
