//! Error types for the PLY measurement client.
//!
//! Two layers:
//!
//! - [`BackendError`] - a failed call against one of the backend collaborators
//!   (object storage, document store, function execution)
//! - [`ClientError`] - the single failure kind handed to the presentation
//!   layer; its `Display` output is the message shown to the user
//!
//! [`ConfigError`] covers invalid configuration values.

use thiserror::Error;

/// Shown when neither the server nor the transport supplied a message.
pub const GENERIC_CONNECTION_FAILURE: &str = "Upload failed. Please check your connection.";

/// Shown when the health probe fails.
pub const CONNECTIVITY_FAILURE: &str = "Unable to connect to Appwrite. Check your configuration.";

/// Shown when a record reaches `failed` without an error message.
pub const GENERIC_PROCESSING_FAILURE: &str = "Processing failed";

// =============================================================================
// Backend Errors
// =============================================================================

/// Errors from a remote collaborator call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Message for the user: server message, then transport message, then
    /// the generic connection failure.
    pub fn user_message(&self) -> String {
        let candidate = match self {
            BackendError::Api { message, .. } => message.trim(),
            BackendError::Transport(message) => message.trim(),
            BackendError::Decode(_) => "",
        };

        if candidate.is_empty() {
            GENERIC_CONNECTION_FAILURE.to_string()
        } else {
            candidate.to_string()
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {name}: `{value}`")]
    InvalidValue { name: String, value: String },

    /// A value parsed but is outside the accepted range.
    #[error("{0}")]
    OutOfRange(String),
}

// =============================================================================
// Client Errors (top-level)
// =============================================================================

/// The failure surfaced to the presentation layer.
///
/// Every variant displays as a plain human-readable message. Views only call
/// `to_string()`, except for [`ClientError::is_connectivity`] which routes the
/// health-probe failure to the connectivity banner instead of the error notice.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// Rejected locally, the backend was never contacted.
    #[error("{0}")]
    InvalidInput(String),

    /// The health probe failed.
    #[error("{0}")]
    Connectivity(String),

    /// A remote call failed mid-operation.
    #[error("{0}")]
    Remote(String),

    /// The record reached `failed`.
    #[error("{0}")]
    ProcessingFailed(String),

    /// The record was still `processing` after the last poll.
    #[error("Processing timeout. Please try again.")]
    Timeout,

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local file access failed.
    #[error("Failed to read file: {0}")]
    Io(String),
}

impl ClientError {
    /// Whether this is the health-probe failure.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ClientError::Connectivity(_))
    }
}

impl From<BackendError> for ClientError {
    fn from(err: BackendError) -> Self {
        ClientError::Remote(err.user_message())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for collaborator calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
