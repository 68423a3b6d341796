//! # Reviewer Skill
//!
//! Second stage of the review pipeline. Critiques and improves the
//! architect's draft.

use tracing::debug;

use super::context::StageContext;
use super::prompts;
use crate::backend::Result;

/// Reviewer stage
pub struct ReviewerSkill;

impl ReviewerSkill {
    pub const ID: &'static str = "reviewer";

    /// One completion with the reviewer prefix followed by `architect_output`.
    pub async fn run(ctx: &StageContext, architect_output: &str) -> Result<Option<String>> {
        let prompt = prompts::reviewer_prompt(architect_output);
        let completion = ctx.complete(&prompt).await?;
        debug!(stage = Self::ID, source = ?completion.source, "stage completed");
        Ok(completion.text)
    }
}
