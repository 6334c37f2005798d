//! Error types for ollamaprime
//!
//! Replaces the undifferentiated process/network failures of the original
//! provisioning script with a typed taxonomy.

use thiserror::Error;

/// Main error type for the bootstrapper
#[derive(Error, Debug)]
pub enum PrimerError {
    /// Daemon never answered within the configured attempt cap
    #[error("Ollama daemon unreachable after {attempts} probe(s)")]
    DaemonUnreachable { attempts: u64 },

    /// Ollama API errors
    #[error("Ollama API error: {0}")]
    OllamaApiError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for bootstrapper operations
pub type Result<T> = std::result::Result<T, PrimerError>;

impl From<anyhow::Error> for PrimerError {
    fn from(err: anyhow::Error) -> Self {
        PrimerError::Generic(err.to_string())
    }
}
