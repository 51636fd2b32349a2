//! Error types for the Atelier feedback service
//!
//! This module provides structured error handling using thiserror for
//! error definitions and anyhow for error propagation at the edges.

use thiserror::Error;

/// Main error type for Atelier operations
#[derive(Error, Debug)]
pub enum AtelierError {
    /// Bad or missing input from a client
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP method not supported on this route
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Feedback store read/write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Atelier operations
pub type Result<T> = std::result::Result<T, AtelierError>;

impl AtelierError {
    /// Wire-level error code carried in the API error envelope
    pub fn code(&self) -> &'static str {
        match self {
            AtelierError::Validation(_) => "INVALID_INPUT",
            AtelierError::NotFound(_) => "NOT_FOUND",
            AtelierError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            AtelierError::Storage(_)
            | AtelierError::Io(_)
            | AtelierError::Serialization(_)
            | AtelierError::Config(_)
            | AtelierError::Other(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convert anyhow::Error to AtelierError
impl From<anyhow::Error> for AtelierError {
    fn from(err: anyhow::Error) -> Self {
        AtelierError::Other(err.to_string())
    }
}
