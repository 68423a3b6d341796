//! # Discovery Gate
//!
//! Runs the resolver as a background task and lets request handlers wait for
//! its outcome. Liveness endpoints read [`Discovery::current`] and never wait;
//! inference paths call [`Discovery::wait`], which returns as soon as the
//! resolver finishes (bounded by its `total_timeout`).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;

use super::client::HealthProbe;
use super::resolver::{self, Resolution, ResolverConfig};

/// Finished discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub resolution: Resolution,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl DiscoveryReport {
    pub fn new(resolution: Resolution, elapsed_ms: u64) -> Self {
        Self {
            resolution,
            finished_at: Utc::now(),
            elapsed_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryState {
    Pending,
    Done(DiscoveryReport),
}

impl DiscoveryState {
    pub fn is_done(&self) -> bool {
        matches!(self, DiscoveryState::Done(_))
    }

    pub fn report(&self) -> Option<&DiscoveryReport> {
        match self {
            DiscoveryState::Done(report) => Some(report),
            DiscoveryState::Pending => None,
        }
    }
}

/// Read side of the discovery gate. Cheap to clone into every handler.
#[derive(Debug, Clone)]
pub struct Discovery {
    rx: watch::Receiver<DiscoveryState>,
}

impl Discovery {
    /// Start resolving in the background.
    pub fn spawn<P>(probe: Arc<P>, config: ResolverConfig) -> Self
    where
        P: HealthProbe + 'static,
    {
        let (tx, rx) = watch::channel(DiscoveryState::Pending);
        tokio::spawn(async move {
            let started = Instant::now();
            let resolution = resolver::resolve(probe.as_ref(), &config).await;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            tx.send_replace(DiscoveryState::Done(DiscoveryReport::new(
                resolution, elapsed_ms,
            )));
        });
        Self { rx }
    }

    /// A gate that is already open, for callers that resolved up front.
    pub fn finished(resolution: Resolution) -> Self {
        let (_tx, rx) = watch::channel(DiscoveryState::Done(DiscoveryReport::new(resolution, 0)));
        Self { rx }
    }

    /// Snapshot without waiting
    pub fn current(&self) -> DiscoveryState {
        self.rx.borrow().clone()
    }

    /// Wait until discovery has finished.
    ///
    /// If the discovery task died without reporting, the backend is treated
    /// as unresolved.
    pub async fn wait(&self) -> DiscoveryReport {
        let mut rx = self.rx.clone();
        let report = rx
            .wait_for(DiscoveryState::is_done)
            .await
            .ok()
            .and_then(|state| state.report().cloned());
        report.unwrap_or_else(|| DiscoveryReport::new(Resolution::Unresolved, 0))
    }
}
