//! Type definitions for Ollama model management
//!
//! Core data structures for talking to the Ollama API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Information about an installed Ollama model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name (e.g., "llama3.2:3b")
    pub name: String,

    /// Model size in bytes
    pub size: u64,

    /// Last modification time
    pub modified_at: DateTime<Utc>,

    /// Model digest/hash
    pub digest: String,
}

/// Response from the Ollama /api/tags endpoint
#[derive(Debug, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// Progress update during a model pull operation
#[derive(Debug, Deserialize)]
pub struct PullProgress {
    /// Status message ("pulling manifest", "success", ...)
    pub status: String,

    /// Digest being pulled
    #[serde(default)]
    pub digest: Option<String>,

    /// Total bytes to download
    #[serde(default)]
    pub total: Option<u64>,

    /// Bytes completed
    #[serde(default)]
    pub completed: Option<u64>,
}

impl ModelInfo {
    /// Format the model size in human-readable format
    pub fn formatted_size(&self) -> String {
        format_size(self.size)
    }
}

impl fmt::Display for ModelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.formatted_size())
    }
}

/// Format bytes into human-readable size
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base: f64 = 1024.0;
    let exponent = (bytes as f64).log(base).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);

    let size = bytes as f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}
