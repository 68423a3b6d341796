//! Prompt templates sent to the backend.

/// Architect - drafts the answer
pub const ARCHITECT_PREFIX: &str = "Architect: ";

/// Reviewer - critiques and improves the architect's draft
pub const REVIEWER_PREFIX: &str = "Reviewer: review and improve the following output:\n\n";

/// Self-test - single completion used to verify connectivity
pub const SELFTEST_PROMPT: &str = "Health check ping";

pub fn architect_prompt(input: &str) -> String {
    format!("{ARCHITECT_PREFIX}{input}")
}

pub fn reviewer_prompt(architect_output: &str) -> String {
    format!("{REVIEWER_PREFIX}{architect_output}")
}
