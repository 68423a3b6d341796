//! # Gateway API
//!
//! Route table and OpenAPI document.

pub mod inference;
pub mod status;

use axum::routing::{get, post};
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::state::SharedState;
use inference::{
    LangchainRequest, PipelineResponse, RunRequest, SelfTestResponse, TextResponse,
};
use status::{BackendResponse, HealthResponse, ReadyResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tandem API",
        version = "0.1.0",
        description = "Architect/reviewer gateway in front of a vLLM completion backend"
    ),
    paths(
        status::health,
        status::ready,
        status::backend,
        inference::selftest,
        inference::run_pipeline,
        inference::run_graph,
        inference::langchain
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            BackendResponse,
            RunRequest,
            LangchainRequest,
            PipelineResponse,
            TextResponse,
            SelfTestResponse,
            ErrorBody
        )
    ),
    tags(
        (name = "status", description = "Liveness, readiness and discovery"),
        (name = "inference", description = "Pipelines and completions")
    )
)]
pub struct ApiDoc;

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(status::health))
        .route("/ready", get(status::ready))
        .route("/backend", get(status::backend))
        .route("/selftest", get(inference::selftest))
        .route("/run", post(inference::run_pipeline))
        .route("/graph/run", post(inference::run_graph))
        .route("/langchain", post(inference::langchain))
        .route("/openapi.json", get(serve_openapi))
        .with_state(state)
}
