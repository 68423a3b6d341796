//! # Tandem Core
//!
//! The "Brain" of the Tandem gateway - backend discovery, the inference
//! client, and the architect → reviewer pipelines.
//!
//! ## Architecture
//!
//! - `backend/` - Inference client, health probing and backend discovery
//! - `models` - Model selection and per-call timeouts
//! - `skills/` - Stage functions (ArchitectSkill, ReviewerSkill) and prompts
//! - `swarm/` - Sequential pipeline, graph engine and the Coordinator façade
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tandem_core::backend::{resolver, InferenceClient, ResolverConfig};
//! use tandem_core::models::ModelConfig;
//! use tandem_core::swarm::Coordinator;
//!
//! let client = InferenceClient::new();
//! let resolution = resolver::resolve(&client, &ResolverConfig::default()).await;
//! let coordinator = Coordinator::new(client, resolution, ModelConfig::default())?;
//! let output = coordinator.run_sequential("Design a rate limiter").await?;
//! ```

pub mod backend;
pub mod models;
pub mod skills;
pub mod swarm;

#[cfg(test)]
pub(crate) mod test_support;
