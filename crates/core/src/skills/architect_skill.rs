//! # Architect Skill
//!
//! First stage of the review pipeline. Drafts an answer to the user's input.

use tracing::debug;

use super::context::StageContext;
use super::prompts;
use crate::backend::Result;

/// Architect stage
pub struct ArchitectSkill;

impl ArchitectSkill {
    pub const ID: &'static str = "architect";

    /// One completion with prompt `"Architect: " + input`.
    ///
    /// Returns the extracted text, which is `None` when the backend answered
    /// with an unexpected shape.
    pub async fn run(ctx: &StageContext, input: &str) -> Result<Option<String>> {
        let prompt = prompts::architect_prompt(input);
        let completion = ctx.complete(&prompt).await?;
        debug!(stage = Self::ID, source = ?completion.source, "stage completed");
        Ok(completion.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::test_support::{context_for, mount_completion, mount_failure};
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_architect_prefixes_prompt() {
        let server = MockServer::start().await;
        mount_completion(&server, "\"prompt\":\"Architect: design a cache\"", "draft", 1).await;

        let out = ArchitectSkill::run(&context_for(&server), "design a cache")
            .await
            .unwrap();
        assert_eq!(out.as_deref(), Some("draft"));
    }

    #[tokio::test]
    async fn test_architect_propagates_backend_error() {
        let server = MockServer::start().await;
        mount_failure(&server, "Architect: ", 500, "boom", 1).await;

        let err = ArchitectSkill::run(&context_for(&server), "x").await.unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 500, .. }));
    }
}
