//! Error types for Levrok
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Levrok operations
///
/// This enum encompasses all possible errors that can occur while talking
/// to the site API: configuration loading, chat transport failures, reply
/// stream decoding, scheduling lookups, and request validation.
#[derive(Error, Debug)]
pub enum LevrokError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chat transport errors (request construction, connection, payload)
    #[error("Chat transport error: {0}")]
    Transport(String),

    /// Reply stream errors (connection-level read failures mid-stream)
    #[error("Reply stream error: {0}")]
    Stream(String),

    /// Scheduling errors (availability lookups, booking flow)
    #[error("Scheduling error: {0}")]
    Scheduling(String),

    /// Request validation errors (malformed dates, missing fields, etc.)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-success status from the site API, with status code context
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// HTTP status code returned by the endpoint
        status: u16,
        /// Message extracted from the error payload, or a generic fallback
        message: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Levrok operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
