//! # Sequential Pipeline
//!
//! Direct architect → reviewer call chain. All-or-nothing: a failure in
//! either stage discards everything produced so far.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::BackendError;
use crate::skills::{ArchitectSkill, ReviewerSkill, StageContext};

/// Stage of the review pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Architect drafting the answer
    Architect,
    /// Reviewer improving the draft
    Reviewer,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Architect => ArchitectSkill::ID,
            Stage::Reviewer => ReviewerSkill::ID,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one pipeline stage, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Architect failed: {0}")]
    Architect(#[source] BackendError),
    #[error("Reviewer failed: {0}")]
    Reviewer(#[source] BackendError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Architect(_) => Stage::Architect,
            PipelineError::Reviewer(_) => Stage::Reviewer,
        }
    }

    pub fn backend_error(&self) -> &BackendError {
        match self {
            PipelineError::Architect(e) | PipelineError::Reviewer(e) => e,
        }
    }
}

/// Both stage outputs of a successful run.
///
/// Either may be `None` when the backend returned an unexpected shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub architect: Option<String>,
    pub reviewer: Option<String>,
}

/// Architect → reviewer, called directly in order.
#[derive(Debug, Clone)]
pub struct SequentialPipeline {
    ctx: StageContext,
}

impl SequentialPipeline {
    pub fn new(ctx: StageContext) -> Self {
        Self { ctx }
    }

    #[tracing::instrument(skip_all, fields(mode = "sequential", input_chars = input.len()))]
    pub async fn run(&self, input: &str) -> Result<PipelineOutput, PipelineError> {
        let architect = ArchitectSkill::run(&self.ctx, input).await.map_err(|e| {
            warn!(stage = %Stage::Architect, error = %e, "stage failed");
            PipelineError::Architect(e)
        })?;

        // An absent draft is reviewed as empty text, deliberately not as a
        // placeholder such as "None" that the reviewer would try to improve.
        let draft = architect.as_deref().unwrap_or_default();
        let reviewer = ReviewerSkill::run(&self.ctx, draft).await.map_err(|e| {
            warn!(stage = %Stage::Reviewer, error = %e, "stage failed");
            PipelineError::Reviewer(e)
        })?;

        info!("pipeline completed");
        Ok(PipelineOutput {
            architect,
            reviewer,
        })
    }
}
