//! # Backend Resolver
//!
//! Discovers a reachable inference backend among candidate addresses.
//!
//! ```text
//! round 1: preferred → host.docker.internal → 172.17.0.1 → 127.0.0.1 → localhost
//!          (first 200 from /health wins, rest of the round is skipped)
//! sleep retry_interval, next round ... until total_timeout
//! ```
//!
//! When nothing answers in time the configured address is used anyway, so
//! individual requests fail later instead of the process failing at startup.

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::address::BackendAddress;
use super::client::HealthProbe;

/// Addresses where a locally published vLLM container usually answers
pub const DEFAULT_FALLBACKS: [&str; 4] = [
    "http://host.docker.internal:8000",
    "http://172.17.0.1:8000",
    "http://127.0.0.1:8000",
    "http://localhost:8000",
];

/// Discovery parameters
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Operator-configured address, probed first
    pub preferred: Option<BackendAddress>,
    /// Fixed fallbacks, probed in order after `preferred`
    pub fallbacks: Vec<BackendAddress>,
    /// Bound on a single `/health` probe
    pub probe_timeout: Duration,
    /// Bound on the whole discovery
    pub total_timeout: Duration,
    /// Pause between unsuccessful rounds
    pub retry_interval: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            preferred: None,
            fallbacks: default_fallbacks(),
            probe_timeout: Duration::from_secs(3),
            total_timeout: Duration::from_secs(60),
            retry_interval: Duration::from_secs(2),
        }
    }
}

impl ResolverConfig {
    pub fn with_preferred(mut self, preferred: Option<BackendAddress>) -> Self {
        self.preferred = preferred;
        self
    }

    pub fn with_fallbacks(mut self, fallbacks: Vec<BackendAddress>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub fn with_timeouts(mut self, probe: Duration, total: Duration, interval: Duration) -> Self {
        self.probe_timeout = probe;
        self.total_timeout = total;
        self.retry_interval = interval;
        self
    }

    /// Ordered candidate list: preferred first, then fallbacks, each once.
    pub fn candidates(&self) -> Vec<BackendAddress> {
        let mut out: Vec<BackendAddress> = Vec::with_capacity(self.fallbacks.len() + 1);
        for candidate in self.preferred.iter().chain(self.fallbacks.iter()) {
            if !out.contains(candidate) {
                out.push(candidate.clone());
            }
        }
        out
    }
}

pub fn default_fallbacks() -> Vec<BackendAddress> {
    DEFAULT_FALLBACKS
        .iter()
        .filter_map(|raw| BackendAddress::parse(raw).ok())
        .collect()
}

/// Outcome of discovery. Fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "address", rename_all = "snake_case")]
pub enum Resolution {
    /// A candidate answered its health probe
    Resolved(BackendAddress),
    /// Nothing answered; falling back to the configured address unverified
    Preferred(BackendAddress),
    /// Nothing answered and no address was configured
    Unresolved,
}

impl Resolution {
    pub fn address(&self) -> Option<&BackendAddress> {
        match self {
            Resolution::Resolved(addr) | Resolution::Preferred(addr) => Some(addr),
            Resolution::Unresolved => None,
        }
    }

    /// True unless a health probe actually succeeded
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Resolution::Resolved(_))
    }
}

/// Probe candidates in rounds until one is healthy or `total_timeout` passes.
pub async fn resolve<P>(probe: &P, config: &ResolverConfig) -> Resolution
where
    P: HealthProbe + ?Sized,
{
    let candidates = config.candidates();
    let started = Instant::now();
    let mut round = 0u32;

    while !candidates.is_empty() && started.elapsed() < config.total_timeout {
        round += 1;
        for candidate in &candidates {
            let healthy = tokio::time::timeout(
                config.probe_timeout,
                probe.probe(candidate, config.probe_timeout),
            )
            .await
            .unwrap_or(false);

            if healthy {
                info!(backend = %candidate, round, "resolved inference backend");
                return Resolution::Resolved(candidate.clone());
            }
            debug!(backend = %candidate, round, "candidate not reachable");
        }

        let remaining = config.total_timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            break;
        }
        tokio::time::sleep(config.retry_interval.min(remaining)).await;
    }

    match &config.preferred {
        Some(preferred) => {
            warn!(
                backend = %preferred,
                rounds = round,
                "no candidate answered its health probe; using configured backend unverified"
            );
            Resolution::Preferred(preferred.clone())
        }
        None => {
            warn!(
                rounds = round,
                "could not resolve an inference backend; set VLLM_URL to a reachable address"
            );
            Resolution::Unresolved
        }
    }
}
