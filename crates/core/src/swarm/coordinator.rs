//! # Coordinator
//!
//! Entry point used by the gateway: owns the per-request stage context and
//! exposes both pipeline strategies plus the raw completion and self-test
//! operations.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use super::graph::{CompileError, GraphError};
use super::graph_pipeline::GraphPipeline;
use super::pipeline::{PipelineError, PipelineOutput, SequentialPipeline};
use crate::backend::{BackendAddress, BackendError, CompletionResponse, InferenceClient, Resolution};
use crate::models::ModelConfig;
use crate::skills::{prompts, StageContext};

/// Default budget for each self-test call
pub const DEFAULT_SELFTEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Which self-test step failed
#[derive(Debug, Error)]
pub enum SelfTestError {
    #[error("backend health check failed: {0}")]
    HealthCheck(#[source] BackendError),
    #[error("backend completion failed: {0}")]
    Completion(#[source] BackendError),
}

/// Successful self-test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfTestReport {
    pub backend: BackendAddress,
    pub sample: Option<String>,
}

/// The pipeline coordinator
///
/// The review graph is compiled once here and reused for every run.
#[derive(Debug, Clone)]
pub struct Coordinator {
    ctx: StageContext,
    graph: GraphPipeline,
    selftest_timeout: Duration,
}

impl Coordinator {
    pub fn new(
        client: InferenceClient,
        resolution: Resolution,
        model: ModelConfig,
    ) -> Result<Self, CompileError> {
        Self::from_context(StageContext::new(client, resolution, model))
    }

    pub fn from_context(ctx: StageContext) -> Result<Self, CompileError> {
        Ok(Self {
            graph: GraphPipeline::new(ctx.clone())?,
            ctx,
            selftest_timeout: DEFAULT_SELFTEST_TIMEOUT,
        })
    }

    pub fn with_selftest_timeout(mut self, timeout: Duration) -> Self {
        self.selftest_timeout = timeout;
        self
    }

    pub fn context(&self) -> &StageContext {
        &self.ctx
    }

    /// Architect → reviewer as a direct call chain
    pub async fn run_sequential(&self, input: &str) -> Result<PipelineOutput, PipelineError> {
        SequentialPipeline::new(self.ctx.clone()).run(input).await
    }

    /// Architect → reviewer through the state graph
    pub async fn run_graph(&self, input: &str) -> Result<PipelineOutput, GraphError> {
        self.graph.run(input).await
    }

    /// One completion with the prompt passed through verbatim
    pub async fn complete_raw(&self, prompt: &str) -> Result<CompletionResponse, BackendError> {
        self.ctx.complete(prompt).await
    }

    /// Probe `/health`, then issue one completion with a fixed prompt.
    pub async fn selftest(&self) -> Result<SelfTestReport, SelfTestError> {
        let backend = self.ctx.backend().map_err(SelfTestError::HealthCheck)?;

        self.ctx
            .client
            .probe_health(backend, self.selftest_timeout)
            .await
            .map_err(|e| {
                warn!(backend = %backend, error = %e, "self-test health check failed");
                SelfTestError::HealthCheck(e)
            })?;

        let completion = self
            .ctx
            .client
            .complete(
                backend,
                &self.ctx.model.model,
                prompts::SELFTEST_PROMPT,
                self.selftest_timeout,
            )
            .await
            .map_err(|e| {
                warn!(backend = %backend, error = %e, "self-test completion failed");
                SelfTestError::Completion(e)
            })?;

        info!(backend = %backend, "self-test passed");
        Ok(SelfTestReport {
            backend: backend.clone(),
            sample: completion.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_for, mount_completion, mount_failure};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_health(server: &MockServer, status: u16) {
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_selftest_success_returns_sample() {
        let server = MockServer::start().await;
        mount_health(&server, 200).await;
        mount_completion(&server, "Health check ping", "pong", 1).await;

        let report = Coordinator::from_context(context_for(&server))
            .unwrap()
            .selftest()
            .await
            .unwrap();
        assert_eq!(report.sample.as_deref(), Some("pong"));
    }

    #[tokio::test]
    async fn test_selftest_health_failure_skips_completion() {
        let server = MockServer::start().await;
        mount_health(&server, 503).await;
        mount_completion(&server, "Health check ping", "pong", 0).await;

        let err = Coordinator::from_context(context_for(&server))
            .unwrap()
            .selftest()
            .await
            .unwrap_err();
        assert!(matches!(err, SelfTestError::HealthCheck(_)));
        assert!(err.to_string().starts_with("backend health check failed"));
    }

    #[tokio::test]
    async fn test_selftest_completion_failure_is_distinct() {
        let server = MockServer::start().await;
        mount_health(&server, 200).await;
        mount_failure(&server, "Health check ping", 500, "nope", 1).await;

        let err = Coordinator::from_context(context_for(&server))
            .unwrap()
            .selftest()
            .await
            .unwrap_err();
        assert!(matches!(err, SelfTestError::Completion(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_selftest_unresolved_is_health_failure() {
        let coordinator = Coordinator::new(
            InferenceClient::new(),
            Resolution::Unresolved,
            ModelConfig::default(),
        )
        .unwrap();
        let err = coordinator.selftest().await.unwrap_err();
        assert!(matches!(err, SelfTestError::HealthCheck(BackendError::Unresolved)));
    }

    #[tokio::test]
    async fn test_complete_raw_passes_prompt_verbatim() {
        let server = MockServer::start().await;
        mount_completion(&server, "\"prompt\":\"just this\"", "ok", 1).await;

        let resp = Coordinator::from_context(context_for(&server))
            .unwrap()
            .complete_raw("just this")
            .await
            .unwrap();
        assert_eq!(resp.text.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_both_strategies_agree() {
        let server = MockServer::start().await;
        mount_completion(&server, "Architect: ", "A", 2).await;
        mount_completion(&server, "Reviewer: ", "R", 2).await;

        let coordinator = Coordinator::from_context(context_for(&server)).unwrap();
        let sequential = coordinator.run_sequential("x").await.unwrap();
        let graph = coordinator.run_graph("x").await.unwrap();
        assert_eq!(sequential, graph);
    }
}
