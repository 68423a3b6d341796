//! # Tandem Models
//!
//! Model selection for calls to the inference backend. The backend serves a
//! single model; every stage of a pipeline uses the same identifier.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model served by the default vLLM deployment
pub const DEFAULT_MODEL: &str = "mistralai/Mistral-Large-3-675B-Instruct-2512";

/// Default budget for a single completion call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for model selection
///
/// Read once at startup and shared read-only by every pipeline run.
///
/// ## Example
/// ```rust,ignore
/// use tandem_core::models::ModelConfig;
///
/// let config = ModelConfig::new("meta-llama/Llama-3.1-8B")
///     .with_call_timeout(Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelConfig {
    /// Model identifier sent in every completion request
    pub model: String,
    /// Per-call timeout for completion requests
    #[serde(with = "duration_secs")]
    pub call_timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl ModelConfig {
    /// Create a model config with the default call timeout
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Override the per-call timeout
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
