//! Gateway error responses.
//!
//! Every failure leaves the gateway as `{"detail": "<message>"}` with a status
//! that tells the caller which side broke.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use tandem_core::backend::BackendError;
use tandem_core::swarm::{CompileError, GraphError, PipelineError, SelfTestError};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                detail: self.message,
            }),
        )
            .into_response()
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        Self::bad_gateway(err.to_string())
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self::bad_gateway(err.to_string())
    }
}

impl From<SelfTestError> for ApiError {
    fn from(err: SelfTestError) -> Self {
        Self::bad_gateway(err.to_string())
    }
}

impl From<CompileError> for ApiError {
    fn from(err: CompileError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        Self::internal(err.to_string())
    }
}
