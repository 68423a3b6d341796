//! # Graph Pipeline
//!
//! The architect → reviewer pipeline expressed as a [`StateGraph`]:
//!
//! ```text
//! [architect] ──► [reviewer] ──► END
//!  input → architect_output → reviewer_output
//! ```

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;

use super::graph::{CompileError, CompiledGraph, GraphError, Node, StateGraph, END};
use super::pipeline::{PipelineError, PipelineOutput};
use super::state::{PipelineState, StateUpdate, ARCHITECT_OUTPUT, REVIEWER_OUTPUT};
use crate::skills::{ArchitectSkill, ReviewerSkill, StageContext};

/// Reads `input`, writes `architect_output`
struct ArchitectNode {
    ctx: StageContext,
}

#[async_trait]
impl Node<PipelineState> for ArchitectNode {
    async fn run(&self, state: &PipelineState) -> anyhow::Result<StateUpdate> {
        let input = state.input().context("state has no input")?;
        let text = ArchitectSkill::run(&self.ctx, input)
            .await
            .map_err(PipelineError::Architect)?;
        Ok(StateUpdate::new().set(ARCHITECT_OUTPUT, text))
    }
}

/// Reads `architect_output`, writes `reviewer_output`
struct ReviewerNode {
    ctx: StageContext,
}

#[async_trait]
impl Node<PipelineState> for ReviewerNode {
    async fn run(&self, state: &PipelineState) -> anyhow::Result<StateUpdate> {
        anyhow::ensure!(
            state.contains(ARCHITECT_OUTPUT),
            "reviewer ran before architect_output was set"
        );
        // Same rule as the sequential pipeline: no text reviews as "".
        let draft = state.architect_output().unwrap_or_default();
        let text = ReviewerSkill::run(&self.ctx, draft)
            .await
            .map_err(PipelineError::Reviewer)?;
        Ok(StateUpdate::new().set(REVIEWER_OUTPUT, text))
    }
}

/// Build the two-node review graph.
pub fn build_review_graph(ctx: StageContext) -> Result<CompiledGraph<PipelineState>, CompileError> {
    let mut graph = StateGraph::new();
    graph
        .add_node(ArchitectSkill::ID, ArchitectNode { ctx: ctx.clone() })
        .add_node(ReviewerSkill::ID, ReviewerNode { ctx })
        .set_entry_point(ArchitectSkill::ID)
        .add_edge(ArchitectSkill::ID, ReviewerSkill::ID)
        .add_edge(ReviewerSkill::ID, END);
    graph.compile()
}

/// Graph-driven review pipeline
#[derive(Debug, Clone)]
pub struct GraphPipeline {
    graph: CompiledGraph<PipelineState>,
}

impl GraphPipeline {
    pub fn new(ctx: StageContext) -> Result<Self, CompileError> {
        Ok(Self {
            graph: build_review_graph(ctx)?,
        })
    }

    /// Run the graph and return its final state.
    pub async fn invoke(&self, input: &str) -> Result<PipelineState, GraphError> {
        self.graph.invoke(PipelineState::new(input)).await
    }

    #[tracing::instrument(skip_all, fields(mode = "graph", input_chars = input.len()))]
    pub async fn run(&self, input: &str) -> Result<PipelineOutput, GraphError> {
        let state = self.invoke(input).await?;
        info!("pipeline completed");
        Ok(PipelineOutput {
            architect: state.architect_output().map(str::to_string),
            reviewer: state.reviewer_output().map(str::to_string),
        })
    }
}
