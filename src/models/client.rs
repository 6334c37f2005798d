//! Ollama API client
//!
//! Low-level HTTP client for the daemon endpoints the bootstrapper needs:
//! liveness probing, model pulls, and model listing.

use crate::errors::{PrimerError, Result};
use crate::models::types::{ModelInfo, ModelsResponse, PullProgress};
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Callback invoked with each pull progress record
pub type ProgressCallback = Box<dyn FnMut(&PullProgress) + Send>;

/// HTTP client for the Ollama API
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a new client for the given base URL
    /// (e.g., "http://127.0.0.1:11434")
    pub fn new(base_url: String) -> Self {
        // Long timeout: pulls download multi-GB artifacts
        let client = Client::builder()
            .timeout(Duration::from_secs(3600))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url }
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe the daemon for liveness
    ///
    /// Any successful response from /api/tags counts as ready; a connection
    /// error counts as not ready.
    pub async fn probe(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);

        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// List all installed models via GET /api/tags
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PrimerError::OllamaApiError(format!("Failed to query models: {}", e)))?;

        if !response.status().is_success() {
            return Err(PrimerError::OllamaApiError(format!(
                "API returned status: {}",
                response.status()
            )));
        }

        let models_response: ModelsResponse = response
            .json()
            .await
            .map_err(|e| PrimerError::OllamaApiError(format!("Failed to parse response: {}", e)))?;

        Ok(models_response.models)
    }

    /// Pull (download) a model via POST /api/pull
    ///
    /// The daemon streams newline-delimited JSON progress records; each one
    /// is handed to `progress_callback` if provided. Pulling an already
    /// installed model is a fast no-op on the daemon side.
    pub async fn pull_model(
        &self,
        name: &str,
        mut progress_callback: Option<ProgressCallback>,
    ) -> Result<()> {
        let url = format!("{}/api/pull", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(|e| PrimerError::OllamaApiError(format!("Failed to connect: {}", e)))?;

        if !response.status().is_success() {
            return Err(PrimerError::OllamaApiError(format!(
                "API returned status: {}",
                response.status()
            )));
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| PrimerError::OllamaApiError(format!("Stream error: {}", e)))?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));
            drain_records(&mut buffer, &mut progress_callback)?;
        }

        // The daemon's final record is not guaranteed a trailing newline
        handle_record(buffer.trim(), &mut progress_callback)?;

        Ok(())
    }
}

/// Parse and dispatch every complete newline-terminated record in `buffer`
fn drain_records(
    buffer: &mut String,
    progress_callback: &mut Option<ProgressCallback>,
) -> Result<()> {
    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..=pos).collect();
        handle_record(line.trim(), progress_callback)?;
    }

    Ok(())
}

/// Parse one progress record, fail on daemon-reported errors, and forward
/// it to the callback
fn handle_record(line: &str, progress_callback: &mut Option<ProgressCallback>) -> Result<()> {
    if line.is_empty() {
        return Ok(());
    }

    let progress: PullProgress = serde_json::from_str(line)
        .map_err(|e| PrimerError::OllamaApiError(format!("Failed to parse progress: {}", e)))?;

    if let Some(error) = progress_error(&progress) {
        return Err(PrimerError::OllamaApiError(error));
    }

    if let Some(ref mut callback) = progress_callback {
        callback(&progress);
    }

    Ok(())
}

/// The pull stream reports failures as a record with an "error" status
/// rather than an HTTP error code
fn progress_error(progress: &PullProgress) -> Option<String> {
    if progress.status.starts_with("error") {
        Some(progress.status.clone())
    } else {
        None
    }
}
