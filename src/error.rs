//! Error types for Uniqa
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Uniqa operations
///
/// This enum encompasses all possible errors that can occur while sending
/// questions to the answer service, managing the login session, and
/// loading configuration.
#[derive(Error, Debug)]
pub enum UniqaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level failures reaching the answer service (unreachable, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Answer service returned a non-success status
    #[error("Service error (status {status}): {message}")]
    Service {
        /// HTTP status code returned by the service
        status: u16,
        /// Server-supplied detail, or the raw body when no detail was given
        message: String,
    },

    /// Answer service returned a body that does not match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A send was attempted while another one is still outstanding
    #[error("A question is already being processed")]
    Busy,

    /// Authentication errors (login failures, expired or invalid tokens)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Session persistence errors (reading or writing the session file)
    #[error("Session error: {0}")]
    Session(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Uniqa operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
