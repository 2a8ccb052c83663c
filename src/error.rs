//! Error types for chemviz
//!
//! This module defines the crate-level error enum and the typed error the
//! remote gateway returns, both built with `thiserror`.

use thiserror::Error;

/// Main error type for chemviz operations
///
/// Covers configuration loading, local file access, serialization and
/// command-line usage problems. Failures of remote calls are reported as
/// [`GatewayError`] and wrapped here only when they escape to the binary.
#[derive(Error, Debug)]
pub enum ChemvizError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local validation failed before any request was issued
    #[error("Validation error: {0}")]
    Validation(String),

    /// A remote call failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),

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

/// Typed failure of a single gateway call
///
/// Every non-2xx response or transport problem surfaces as one of these.
/// Callers decide whether to show [`GatewayError::server_message`] or their
/// own fallback text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The server answered with a non-success status
    #[error("Server rejected request with HTTP {status}{}", message_suffix(.message))]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body, if any
        message: Option<String>,
    },

    /// The request never produced a response (connect, timeout, TLS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response arrived but its body did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

fn message_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

impl GatewayError {
    /// Server-supplied message, present only for rejections that carried one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Server message when present, otherwise `fallback`
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    /// HTTP status for rejections
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Result type alias for chemviz operations
///
/// Uses `anyhow::Error` so command handlers can attach context freely.
pub type Result<T> = anyhow::Result<T>;

/// Result type returned by every gateway call
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
