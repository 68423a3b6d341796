//! Thin typed wrapper around the backend's HTTP API.
//!
//! [`InferenceClient`] issues exactly one request per call and never
//! retries; retrying belongs to the resolver alone.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, trace};

use super::address::BackendAddress;
use super::error::{BackendError, Result};
use super::types::{CompletionRequest, CompletionResponse};

/// Something that can tell whether a backend candidate is up.
///
/// The resolver only needs this narrow view, which keeps discovery testable
/// without a network.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// True only when `<address>/health` answered 200 within `timeout`
    async fn probe(&self, address: &BackendAddress, timeout: Duration) -> bool;
}

/// Client for the inference backend's completion and health endpoints.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone, Default)]
pub struct InferenceClient {
    http: reqwest::Client,
}

impl InferenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a pre-configured reqwest client (proxies, TLS roots, ...)
    pub fn with_http_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// POST `<backend>/v1/completions` with `{model, prompt}`.
    pub async fn complete(
        &self,
        backend: &BackendAddress,
        model: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<CompletionResponse> {
        let url = backend.join("v1/completions");
        let request = CompletionRequest::new(model, prompt);

        debug!(
            backend = %backend,
            model = %model,
            prompt_chars = prompt.len(),
            "sending completion request"
        );

        let response = self
            .http
            .post(&url)
            .timeout(timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            debug!(backend = %backend, status = status.as_u16(), "completion rejected");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let completion = CompletionResponse::extract(&bytes)?;

        trace!(source = ?completion.source, "completion text extracted");
        Ok(completion)
    }

    /// GET `<backend>/health`, keeping the failure reason.
    pub async fn probe_health(&self, backend: &BackendAddress, timeout: Duration) -> Result<()> {
        let response = self
            .http
            .get(backend.join("health"))
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(BackendError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// GET `<backend>/health`; true only on 200. Never errors.
    pub async fn check_health(&self, backend: &BackendAddress, timeout: Duration) -> bool {
        match self.probe_health(backend, timeout).await {
            Ok(()) => true,
            Err(e) => {
                trace!(backend = %backend, error = %e, "health probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl HealthProbe for InferenceClient {
    async fn probe(&self, address: &BackendAddress, timeout: Duration) -> bool {
        self.check_health(address, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn address(server: &MockServer) -> BackendAddress {
        BackendAddress::parse(&server.uri()).unwrap()
    }

    #[tokio::test]
    async fn complete_posts_model_and_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .and(body_json(json!({"model": "m", "prompt": "hello"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"choices": [{"text": "hi"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = InferenceClient::new();
        let resp = client
            .complete(&address(&server), "m", "hello", TIMEOUT)
            .await
            .unwrap();
        assert_eq!(resp.text.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn complete_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unknown model"))
            .mount(&server)
            .await;

        let err = InferenceClient::new()
            .complete(&address(&server), "m", "hello", TIMEOUT)
            .await
            .unwrap_err();
        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "unknown model");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_non_200_success_code_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"text": "x"})))
            .mount(&server)
            .await;

        let err = InferenceClient::new()
            .complete(&address(&server), "m", "hello", TIMEOUT)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(201));
    }

    #[tokio::test]
    async fn complete_unexpected_shape_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x"})))
            .mount(&server)
            .await;

        let resp = InferenceClient::new()
            .complete(&address(&server), "m", "hello", TIMEOUT)
            .await
            .unwrap();
        assert_eq!(resp.text, None);
    }

    #[tokio::test]
    async fn complete_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"text": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = InferenceClient::new()
            .complete(&address(&server), "m", "hello", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Timeout));
    }

    #[tokio::test]
    async fn complete_connection_refused_is_transport() {
        let backend = BackendAddress::parse("http://127.0.0.1:1").unwrap();
        let err = InferenceClient::new()
            .complete(&backend, "m", "hello", TIMEOUT)
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn check_health_is_true_only_on_200() {
        let healthy = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&healthy)
            .await;

        let unhealthy = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&unhealthy)
            .await;

        let client = InferenceClient::new();
        assert!(client.check_health(&address(&healthy), TIMEOUT).await);
        assert!(!client.check_health(&address(&unhealthy), TIMEOUT).await);

        let refused = BackendAddress::parse("http://127.0.0.1:1").unwrap();
        assert!(!client.check_health(&refused, TIMEOUT).await);
        assert!(!client.probe(&refused, TIMEOUT).await);
    }
}
