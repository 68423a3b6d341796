//! # Status API
//!
//! Liveness, readiness and discovery endpoints. None of these wait for
//! discovery or touch the backend.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use tandem_core::backend::{DiscoveryState, Resolution};

use crate::state::SharedState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BackendResponse {
    /// pending, resolved, preferred or unresolved
    pub state: String,
    pub address: Option<String>,
    pub degraded: bool,
    pub model: String,
    pub image_backend: String,
    pub finished_at: Option<String>,
    pub elapsed_ms: Option<u64>,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "status",
    responses(
        (status = 200, description = "Gateway is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness check
#[utoipa::path(
    get,
    path = "/ready",
    tag = "status",
    responses(
        (status = 200, description = "A backend address is known", body = ReadyResponse),
        (status = 503, description = "Discovery pending or unresolved", body = ReadyResponse)
    )
)]
pub async fn ready(State(state): State<SharedState>) -> Response {
    let not_ready = |reason: &str| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "not ready".to_string(),
                backend: None,
                degraded: None,
                reason: Some(reason.to_string()),
            }),
        )
            .into_response()
    };

    match state.discovery.current() {
        DiscoveryState::Pending => not_ready("backend discovery in progress"),
        DiscoveryState::Done(report) => match report.resolution.address() {
            Some(addr) => (
                StatusCode::OK,
                Json(ReadyResponse {
                    status: "ready".to_string(),
                    backend: Some(addr.to_string()),
                    degraded: Some(report.resolution.is_degraded()),
                    reason: None,
                }),
            )
                .into_response(),
            None => not_ready("no inference backend could be resolved"),
        },
    }
}

/// Discovery snapshot
#[utoipa::path(
    get,
    path = "/backend",
    tag = "status",
    responses(
        (status = 200, description = "Current discovery state", body = BackendResponse)
    )
)]
pub async fn backend(State(state): State<SharedState>) -> Json<BackendResponse> {
    let snapshot = state.discovery.current();
    let report = snapshot.report();
    let resolution = report.map(|r| &r.resolution);

    let label = match resolution {
        None => "pending",
        Some(Resolution::Resolved(_)) => "resolved",
        Some(Resolution::Preferred(_)) => "preferred",
        Some(Resolution::Unresolved) => "unresolved",
    };

    Json(BackendResponse {
        state: label.to_string(),
        address: resolution.and_then(Resolution::address).map(ToString::to_string),
        degraded: resolution.map_or(true, Resolution::is_degraded),
        model: state.config.model.model.clone(),
        image_backend: state.config.image_backend.clone(),
        finished_at: report.map(|r| r.finished_at.to_rfc3339()),
        elapsed_ms: report.map(|r| r.elapsed_ms),
    })
}
