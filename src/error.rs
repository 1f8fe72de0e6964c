//! Domain-specific error types for sds-console

use thiserror::Error;

/// Main error type for the sds-console client
#[derive(Error, Debug)]
pub enum SdsConsoleError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("HTTP request failed: {message}")]
    Http { message: String },

    #[error("Service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("IO error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<reqwest::Error> for SdsConsoleError {
    fn from(err: reqwest::Error) -> Self {
        SdsConsoleError::Http {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SdsConsoleError {
    fn from(err: serde_json::Error) -> Self {
        SdsConsoleError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SdsConsoleError {
    fn from(err: std::io::Error) -> Self {
        SdsConsoleError::Io {
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for SdsConsoleError {
    fn from(err: anyhow::Error) -> Self {
        SdsConsoleError::Internal {
            message: err.to_string(),
        }
    }
}

impl SdsConsoleError {
    /// One-shot message shown in the status line of the interactive mode.
    pub fn user_message(&self) -> String {
        match self {
            SdsConsoleError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for sds-console operations
pub type Result<T> = std::result::Result<T, SdsConsoleError>;
