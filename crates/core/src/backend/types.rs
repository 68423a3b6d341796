//! Wire types for the backend's `/v1/completions` endpoint.

use serde::{Deserialize, Serialize};

use super::error::{BackendError, Result};

/// Body of a completion request. Built fresh for every call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

/// Which response schema the text was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// `{"choices": [{"text": ...}, ...]}`
    Choice,
    /// `{"text": ...}`
    TopLevel,
    /// Neither schema matched
    Absent,
}

/// Text extracted from a completion response.
///
/// `text` may be `None` when the backend answered 200 with an unexpected
/// shape; callers surface that as a null rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionResponse {
    pub text: Option<String>,
    pub source: TextSource,
}

/// Schema A: OpenAI-style choices list
#[derive(Deserialize)]
struct ChoicesPayload {
    choices: Vec<ChoicePayload>,
}

#[derive(Deserialize)]
struct ChoicePayload {
    #[serde(default)]
    text: Option<String>,
}

/// Schema B: bare text field
#[derive(Deserialize)]
struct TextPayload {
    text: Option<String>,
}

impl CompletionResponse {
    /// Extract text from a raw 200 response body.
    ///
    /// A non-empty `choices` list wins even when its first element has no
    /// `text`; only an absent or empty list falls through to the top-level
    /// field.
    pub fn extract(body: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| BackendError::InvalidResponse(format!("body is not JSON: {e}")))?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: serde_json::Value) -> Self {
        if let Ok(payload) = serde_json::from_value::<ChoicesPayload>(value.clone()) {
            if let Some(first) = payload.choices.into_iter().next() {
                return Self {
                    text: first.text,
                    source: TextSource::Choice,
                };
            }
        }

        match serde_json::from_value::<TextPayload>(value) {
            Ok(TextPayload { text: Some(text) }) => Self {
                text: Some(text),
                source: TextSource::TopLevel,
            },
            _ => Self::absent(),
        }
    }

    pub fn absent() -> Self {
        Self {
            text: None,
            source: TextSource::Absent,
        }
    }
}
