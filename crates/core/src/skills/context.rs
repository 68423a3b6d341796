//! Shared, read-only inputs for stage calls.

use crate::backend::{
    BackendAddress, BackendError, CompletionResponse, InferenceClient, Resolution, Result,
};
use crate::models::ModelConfig;

/// Everything a stage needs to call the backend.
///
/// Built per request from process-wide immutable values; holds no mutable
/// state of its own.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub client: InferenceClient,
    pub resolution: Resolution,
    pub model: ModelConfig,
}

impl StageContext {
    pub fn new(client: InferenceClient, resolution: Resolution, model: ModelConfig) -> Self {
        Self {
            client,
            resolution,
            model,
        }
    }

    /// The resolved backend, or `Unresolved`
    pub fn backend(&self) -> Result<&BackendAddress> {
        self.resolution.address().ok_or(BackendError::Unresolved)
    }

    /// One completion against the resolved backend with the configured model.
    pub async fn complete(&self, prompt: &str) -> Result<CompletionResponse> {
        let backend = self.backend()?;
        self.client
            .complete(backend, &self.model.model, prompt, self.model.call_timeout)
            .await
    }
}
