//! Error types for the gesture bridge core

use thiserror::Error;

/// Result type alias for gesture bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the gesture bridge core
///
/// Only configuration, input validation and runtime-handle errors ever reach
/// a caller of the pipeline. Classifier errors are produced by
/// [`ClassificationClient`](crate::client::ClassificationClient)
/// implementations and absorbed by the session layer as soft failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Landmark vector rejected at the pipeline boundary
    #[error("Malformed landmark frame: expected {expected} values, got {actual}")]
    MalformedFrame {
        /// Required vector length
        expected: usize,
        /// Length actually received
        actual: usize,
    },

    /// Landmark vector contains NaN or infinite coordinates
    #[error("Malformed landmark frame: non-finite value at index {index}")]
    NonFiniteLandmark {
        /// Offset of the first offending value
        index: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Classification request could not be sent or completed
    #[error("Classifier request to {endpoint} failed: {reason}")]
    ClassifierRequest {
        /// Endpoint URL
        endpoint: String,
        /// Transport-level failure reason
        reason: String,
    },

    /// Classification endpoint answered with a non-success status
    #[error("Classifier at {endpoint} returned HTTP status {status}")]
    ClassifierStatus {
        /// Endpoint URL
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// Classification request exceeded its deadline
    #[error("Classifier timeout after {timeout_ms}ms")]
    ClassifierTimeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Classification endpoint answered with a body we cannot interpret
    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),

    /// Text-to-sign submission rejected
    #[error("Invalid text submission: {0}")]
    InvalidText(String),

    /// The translator task has stopped and no longer accepts commands
    #[error("Translator is not running")]
    ChannelClosed,

    /// The translator task panicked or was cancelled
    #[error("Translator task failed: {0}")]
    Runtime(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error is a soft classifier failure (frame dropped, no state change)
    pub fn is_classifier_failure(&self) -> bool {
        matches!(
            self,
            Error::ClassifierRequest { .. }
                | Error::ClassifierStatus { .. }
                | Error::ClassifierTimeout { .. }
                | Error::MalformedResponse(_)
        )
    }
}
