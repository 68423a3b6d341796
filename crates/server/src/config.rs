//! Gateway configuration.
//!
//! Read once at startup from CLI flags, falling back to environment variables
//! (a `.env` file is loaded first). Immutable afterwards.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use tandem_core::backend::{BackendAddress, ResolverConfig};
use tandem_core::models::{ModelConfig, DEFAULT_MODEL};

pub const DEFAULT_IMAGE_BACKEND: &str = "http://comfyui:8188";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Tandem - architect/reviewer gateway for a vLLM backend")]
pub struct Cli {
    #[command(flatten)]
    pub gateway: GatewayArgs,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Start the HTTP gateway (default)
    Serve,
    /// Run the pipeline once on a prompt and print the result as JSON
    Run {
        /// Prompt handed to the architect stage
        prompt: String,
        /// Use the graph engine instead of the direct call chain
        #[arg(long)]
        graph: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct GatewayArgs {
    /// Inference backend probed before the built-in fallbacks
    #[arg(long, env = "VLLM_URL")]
    pub vllm_url: Option<String>,

    /// Image backend (reported, not called)
    #[arg(long, env = "COMFYUI_URL", default_value = DEFAULT_IMAGE_BACKEND)]
    pub comfyui_url: String,

    /// Model identifier sent with every completion
    #[arg(long, env = "MODEL_NAME", default_value = DEFAULT_MODEL)]
    pub model_name: String,

    #[arg(long, env = "TANDEM_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(short, long, env = "TANDEM_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Per-probe health check timeout
    #[arg(long, env = "TANDEM_PROBE_TIMEOUT_SECS", default_value_t = 3)]
    pub probe_timeout_secs: u64,

    /// Bound on backend discovery
    #[arg(long, env = "TANDEM_DISCOVERY_TIMEOUT_SECS", default_value_t = 60)]
    pub discovery_timeout_secs: u64,

    /// Pause between discovery rounds
    #[arg(long, env = "TANDEM_RETRY_INTERVAL_SECS", default_value_t = 2)]
    pub retry_interval_secs: u64,

    /// Per-completion timeout
    #[arg(long, env = "TANDEM_CALL_TIMEOUT_SECS", default_value_t = 30)]
    pub call_timeout_secs: u64,

    /// Emit logs as JSON lines
    #[arg(long, env = "TANDEM_LOG_JSON")]
    pub log_json: bool,
}

/// Validated gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub image_backend: String,
    pub model: ModelConfig,
    pub resolver: ResolverConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            image_backend: DEFAULT_IMAGE_BACKEND.to_string(),
            model: ModelConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn from_args(args: &GatewayArgs) -> anyhow::Result<Self> {
        // An empty VLLM_URL means "not set"
        let preferred = match args.vllm_url.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                BackendAddress::parse(raw).with_context(|| format!("invalid VLLM_URL {raw:?}"))?,
            ),
            _ => None,
        };

        let resolver = ResolverConfig::default()
            .with_preferred(preferred)
            .with_timeouts(
                Duration::from_secs(args.probe_timeout_secs),
                Duration::from_secs(args.discovery_timeout_secs),
                Duration::from_secs(args.retry_interval_secs),
            );

        Ok(Self {
            host: args.host.clone(),
            port: args.port,
            image_backend: args.comfyui_url.clone(),
            model: ModelConfig::new(args.model_name.clone())
                .with_call_timeout(Duration::from_secs(args.call_timeout_secs)),
            resolver,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
