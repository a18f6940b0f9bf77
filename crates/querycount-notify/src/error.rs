//! Error types for webhook notification.
//!
//! These errors are only ever logged. None of them is retried or reported
//! back to the API client.

use thiserror::Error;

/// Result type alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Failure modes of a single webhook call.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// HTTP client could not be built.
    #[error("invalid notifier configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// Payload could not be encoded as JSON.
    #[error("failed to serialize webhook payload: {message}")]
    Serialization {
        /// Serializer error message
        message: String,
    },

    /// Network-level failure.
    #[error("webhook request failed: {message}")]
    Network {
        /// Error message describing the network failure
        message: String,
    },

    /// Request exceeded the client timeout.
    #[error("webhook request timed out after {timeout_seconds}s")]
    Timeout {
        /// Configured timeout in seconds
        timeout_seconds: u64,
    },

    /// Endpoint answered with a non-2xx status.
    #[error("webhook endpoint rejected notification: HTTP {status_code}")]
    Rejected {
        /// HTTP status code returned by the endpoint
        status_code: u16,
    },
}

impl NotifyError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into() }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    /// Creates a rejection error from an HTTP status.
    pub fn rejected(status_code: u16) -> Self {
        Self::Rejected { status_code }
    }
}
