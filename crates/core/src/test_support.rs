//! Mock-backend helpers shared by the unit tests.

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::backend::{BackendAddress, InferenceClient, Resolution};
use crate::models::ModelConfig;
use crate::skills::StageContext;

pub(crate) const TEST_MODEL: &str = "test-model";

pub(crate) fn context_for(server: &MockServer) -> StageContext {
    let backend = BackendAddress::parse(&server.uri()).expect("mock server uri");
    StageContext::new(
        InferenceClient::new(),
        Resolution::Resolved(backend),
        ModelConfig::new(TEST_MODEL),
    )
}

/// Answer completions whose prompt contains `needle` with `text`.
pub(crate) async fn mount_completion(
    server: &MockServer,
    needle: &str,
    text: &str,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_string_contains(needle))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"text": text}]
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Answer completions whose prompt contains `needle` with an arbitrary body.
pub(crate) async fn mount_json(
    server: &MockServer,
    needle: &str,
    body: serde_json::Value,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_string_contains(needle))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Fail completions whose prompt contains `needle`.
pub(crate) async fn mount_failure(
    server: &MockServer,
    needle: &str,
    status: u16,
    body: &str,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .and(body_string_contains(needle))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// The reviewer prompt for an empty draft, as it appears in the request body.
pub(crate) const EMPTY_DRAFT_REVIEW: &str =
    "\"prompt\":\"Reviewer: review and improve the following output:\\n\\n\"";
