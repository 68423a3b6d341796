//! Shared application state.

use std::sync::Arc;
use tokio::sync::OnceCell;

use tandem_core::backend::{Discovery, InferenceClient};
use tandem_core::swarm::{CompileError, Coordinator};

use crate::config::GatewayConfig;

/// Process-wide, read-only after startup
pub struct AppState {
    pub config: GatewayConfig,
    pub client: InferenceClient,
    pub discovery: Discovery,
    coordinator: OnceCell<Coordinator>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: GatewayConfig, client: InferenceClient, discovery: Discovery) -> Self {
        Self {
            config,
            client,
            discovery,
            coordinator: OnceCell::new(),
        }
    }

    /// The coordinator bound to the discovered backend.
    ///
    /// Waits for discovery; built once and shared by every later request.
    pub async fn coordinator(&self) -> Result<&Coordinator, CompileError> {
        self.coordinator
            .get_or_try_init(|| async move {
                let report = self.discovery.wait().await;
                Coordinator::new(
                    self.client.clone(),
                    report.resolution,
                    self.config.model.clone(),
                )
            })
            .await
    }
}
