//! # Pipeline Orchestration
//!
//! Runs the fixed two-stage review pipeline.
//!
//! ## Pipeline Flow
//!
//! ```text
//! input → Architect → Reviewer → {architect, reviewer}
//! ```
//!
//! Two equivalent strategies: [`SequentialPipeline`] calls the stages
//! directly; [`GraphPipeline`] runs them as nodes of a [`StateGraph`].

pub mod coordinator;
pub mod graph;
pub mod graph_pipeline;
pub mod pipeline;
pub mod state;

pub use coordinator::{Coordinator, SelfTestError, SelfTestReport};
pub use graph::{
    node_fn, CompileError, CompiledGraph, GraphError, GraphState, Node, StateGraph, END,
};
pub use graph_pipeline::{build_review_graph, GraphPipeline};
pub use pipeline::{PipelineError, PipelineOutput, SequentialPipeline, Stage};
pub use state::{PipelineState, StateUpdate};
