//! Tandem Server
//!
//! Axum gateway in front of a vLLM-compatible completion backend. Backend
//! discovery runs in the background; liveness routes answer immediately and
//! inference routes wait for discovery to finish.

mod api;
mod config;
mod error;
mod logging;
mod state;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use tandem_core::backend::{Discovery, InferenceClient};
use tandem_core::swarm::Coordinator;

use crate::config::{Cli, CliCommand, GatewayConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init_logging(cli.gateway.log_json);
    let config = GatewayConfig::from_args(&cli.gateway)?;

    match cli.command.unwrap_or(CliCommand::Serve) {
        CliCommand::Serve => run_server(config).await,
        CliCommand::Run { prompt, graph } => run_once(config, &prompt, graph).await,
    }
}

fn start_discovery(config: &GatewayConfig, client: &InferenceClient) -> Discovery {
    info!(
        candidates = ?config.resolver.candidates().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        "starting backend discovery"
    );
    Discovery::spawn(Arc::new(client.clone()), config.resolver.clone())
}

pub async fn run_server(config: GatewayConfig) -> anyhow::Result<()> {
    let client = InferenceClient::new();
    let discovery = start_discovery(&config, &client);
    let bind_addr = config.bind_addr();

    info!(
        model = %config.model.model,
        image_backend = %config.image_backend,
        "gateway configured"
    );

    let app = api::router(Arc::new(AppState::new(config, client, discovery)));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "tandem listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("tandem stopped");
    Ok(())
}

async fn run_once(config: GatewayConfig, prompt: &str, graph: bool) -> anyhow::Result<()> {
    let client = InferenceClient::new();
    let report = start_discovery(&config, &client).wait().await;
    let coordinator = Coordinator::new(client, report.resolution, config.model)?;

    let output = if graph {
        coordinator.run_graph(prompt).await?
    } else {
        coordinator.run_sequential(prompt).await?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
