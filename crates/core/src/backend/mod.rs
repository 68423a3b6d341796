//! # Inference Backend
//!
//! Everything that talks to the language-model backend.
//!
//! ## Flow
//!
//! ```text
//! ResolverConfig → resolve() → Resolution → InferenceClient::complete()
//!                      │
//!                      └── HealthProbe (GET <candidate>/health)
//! ```

pub mod address;
pub mod client;
pub mod discovery;
pub mod error;
pub mod resolver;
pub mod types;

pub use address::BackendAddress;
pub use client::{HealthProbe, InferenceClient};
pub use discovery::{Discovery, DiscoveryReport, DiscoveryState};
pub use error::{BackendError, Result};
pub use resolver::{Resolution, ResolverConfig};
pub use types::{CompletionRequest, CompletionResponse, TextSource};
