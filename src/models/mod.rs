//! Model management: Ollama API client and types

pub mod client;
pub mod types;

pub use client::{OllamaClient, ProgressCallback};
pub use types::{format_size, ModelInfo, PullProgress};

use crate::errors::Result;
use async_trait::async_trait;

/// Seam between the bootstrapper and the daemon it provisions
///
/// Implemented by [`OllamaClient`] in production and by mocks in tests.
#[async_trait]
pub trait ModelDaemon: Send + Sync {
    /// Liveness probe: true if the daemon answered
    async fn probe(&self) -> bool;

    /// Request that the daemon fetch/install the named model
    async fn pull_model(&self, name: &str, progress: Option<ProgressCallback>) -> Result<()>;

    /// List currently installed models
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}

#[async_trait]
impl<D: ModelDaemon + ?Sized> ModelDaemon for std::sync::Arc<D> {
    async fn probe(&self) -> bool {
        (**self).probe().await
    }

    async fn pull_model(&self, name: &str, progress: Option<ProgressCallback>) -> Result<()> {
        (**self).pull_model(name, progress).await
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        (**self).list_models().await
    }
}

#[async_trait]
impl ModelDaemon for OllamaClient {
    async fn probe(&self) -> bool {
        OllamaClient::probe(self).await
    }

    async fn pull_model(&self, name: &str, progress: Option<ProgressCallback>) -> Result<()> {
        OllamaClient::pull_model(self, name, progress).await
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        OllamaClient::list_models(self).await
    }
}
