//! # Inference API
//!
//! Pipeline and completion endpoints. Each handler waits for backend
//! discovery before issuing any call.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use tandem_core::swarm::PipelineOutput;

use crate::error::{ApiError, ErrorBody};
use crate::state::SharedState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RunRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LangchainRequest {
    pub input: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PipelineResponse {
    pub architect: Option<String>,
    pub reviewer: Option<String>,
}

impl From<PipelineOutput> for PipelineResponse {
    fn from(output: PipelineOutput) -> Self {
        Self {
            architect: output.architect,
            reviewer: output.reviewer,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TextResponse {
    pub text: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SelfTestResponse {
    pub status: String,
    pub sample: Option<String>,
}

/// Probe the backend and issue one completion
#[utoipa::path(
    get,
    path = "/selftest",
    tag = "inference",
    responses(
        (status = 200, description = "Backend healthy and completing", body = SelfTestResponse),
        (status = 502, description = "Health check or completion failed", body = ErrorBody)
    )
)]
pub async fn selftest(State(state): State<SharedState>) -> Result<Json<SelfTestResponse>, ApiError> {
    let report = state.coordinator().await?.selftest().await.map_err(|e| {
        warn!(error = %e, "self-test failed");
        ApiError::from(e)
    })?;

    Ok(Json(SelfTestResponse {
        status: "ok".to_string(),
        sample: report.sample,
    }))
}

/// Run architect then reviewer as a direct call chain
#[utoipa::path(
    post,
    path = "/run",
    tag = "inference",
    request_body = RunRequest,
    responses(
        (status = 200, description = "Both stage outputs", body = PipelineResponse),
        (status = 502, description = "A stage failed", body = ErrorBody)
    )
)]
pub async fn run_pipeline(
    State(state): State<SharedState>,
    Json(req): Json<RunRequest>,
) -> Result<Json<PipelineResponse>, ApiError> {
    let output = state
        .coordinator()
        .await?
        .run_sequential(&req.prompt)
        .await
        .map_err(|e| {
            warn!(stage = %e.stage(), error = %e, "pipeline failed");
            ApiError::from(e)
        })?;
    Ok(Json(output.into()))
}

/// Run architect then reviewer through the graph engine
#[utoipa::path(
    post,
    path = "/graph/run",
    tag = "inference",
    request_body = RunRequest,
    responses(
        (status = 200, description = "Both stage outputs", body = PipelineResponse),
        (status = 500, description = "Graph execution failed", body = ErrorBody)
    )
)]
pub async fn run_graph(
    State(state): State<SharedState>,
    Json(req): Json<RunRequest>,
) -> Result<Json<PipelineResponse>, ApiError> {
    let output = state
        .coordinator()
        .await?
        .run_graph(&req.prompt)
        .await
        .map_err(|e| {
            warn!(node = ?e.failed_node(), error = %e, "graph run failed");
            ApiError::from(e)
        })?;
    Ok(Json(output.into()))
}

/// Single completion with the input passed through verbatim
#[utoipa::path(
    post,
    path = "/langchain",
    tag = "inference",
    request_body = LangchainRequest,
    responses(
        (status = 200, description = "Generated text", body = TextResponse),
        (status = 502, description = "Backend call failed", body = ErrorBody)
    )
)]
pub async fn langchain(
    State(state): State<SharedState>,
    Json(req): Json<LangchainRequest>,
) -> Result<Json<TextResponse>, ApiError> {
    let completion = state
        .coordinator()
        .await?
        .complete_raw(&req.input)
        .await
        .map_err(|e| {
            warn!(error = %e, "completion failed");
            ApiError::from(e)
        })?;
    Ok(Json(TextResponse {
        text: completion.text,
    }))
}
