//! # State Graph
//!
//! A small directed-graph executor that threads one mutable state value
//! through named nodes.
//!
//! ```text
//! StateGraph::new()
//!   .add_node("a", ..).add_node("b", ..)
//!   .set_entry_point("a")
//!   .add_edge("a", "b").add_edge("b", END)
//!   .compile()? ──► CompiledGraph::invoke(initial) ──► final state
//! ```
//!
//! Each node receives the current state and returns a partial update, which
//! is merged into the state before any successor runs. Successors are kept
//! as ordered lists and scheduled in supersteps, so branching graphs run
//! breadth-first in edge-insertion order and joins run once per step. A failing node halts execution; the partially
//! merged state is dropped with the error.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Terminal marker for edges
pub const END: &str = "__end__";

/// Node executions allowed per invocation before assuming a cycle
pub const DEFAULT_STEP_LIMIT: usize = 25;

/// State threaded through a graph
pub trait GraphState: Send + Sync + 'static {
    /// Partial update produced by a node
    type Update: Send;

    /// Merge an update into the state. Must never remove existing keys.
    fn apply(&mut self, update: Self::Update);
}

/// A named state-transforming step
#[async_trait]
pub trait Node<S: GraphState>: Send + Sync {
    async fn run(&self, state: &S) -> anyhow::Result<S::Update>;
}

/// Adapter turning an async closure over a state snapshot into a [`Node`]
pub struct FnNode<F>(F);

/// Wrap a closure as a node. The closure receives a clone of the state.
pub fn node_fn<S, F, Fut>(f: F) -> FnNode<F>
where
    S: GraphState + Clone,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<S::Update>> + Send,
{
    FnNode(f)
}

#[async_trait]
impl<S, F, Fut> Node<S> for FnNode<F>
where
    S: GraphState + Clone,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<S::Update>> + Send,
{
    async fn run(&self, state: &S) -> anyhow::Result<S::Update> {
        (self.0)(state.clone()).await
    }
}

/// Structural problems found while compiling a graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("no entry point set")]
    MissingEntryPoint,
    #[error("node '{0}' is defined more than once")]
    DuplicateNode(String),
    #[error("'{0}' is reserved for the terminal marker")]
    ReservedName(String),
    #[error("reference to unknown node '{0}'")]
    UnknownNode(String),
    #[error("node '{0}' has no outgoing edge")]
    NoOutgoingEdge(String),
}

/// Failure while executing a compiled graph
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node '{node}' failed: {source}")]
    NodeFailed {
        node: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("graph exceeded its step limit of {0}")]
    StepLimitExceeded(usize),
    #[error("invalid graph: {0}")]
    Compile(#[from] CompileError),
}

impl GraphError {
    /// Name of the node that failed, if a node failed
    pub fn failed_node(&self) -> Option<&str> {
        match self {
            GraphError::NodeFailed { node, .. } => Some(node),
            _ => None,
        }
    }
}

/// Builder for a graph of named nodes
pub struct StateGraph<S: GraphState> {
    nodes: Vec<(String, Arc<dyn Node<S>>)>,
    edges: Vec<(String, String)>,
    entry: Option<String>,
    step_limit: usize,
    error: Option<CompileError>,
}

impl<S: GraphState> Default for StateGraph<S> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            entry: None,
            step_limit: DEFAULT_STEP_LIMIT,
            error: None,
        }
    }
}

impl<S: GraphState> StateGraph<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>, node: impl Node<S> + 'static) -> &mut Self {
        let name = name.into();
        if name == END {
            self.record(CompileError::ReservedName(name));
        } else if self.nodes.iter().any(|(n, _)| *n == name) {
            self.record(CompileError::DuplicateNode(name));
        } else {
            self.nodes.push((name, Arc::new(node)));
        }
        self
    }

    /// Append `to` to the successor list of `from`. `to` may be [`END`].
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    pub fn set_entry_point(&mut self, name: impl Into<String>) -> &mut Self {
        self.entry = Some(name.into());
        self
    }

    pub fn with_step_limit(&mut self, limit: usize) -> &mut Self {
        self.step_limit = limit;
        self
    }

    fn record(&mut self, error: CompileError) {
        self.error.get_or_insert(error);
    }

    /// Validate the graph and resolve names to indices.
    pub fn compile(self) -> Result<CompiledGraph<S>, CompileError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let index: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.as_str(), i))
            .collect();
        let lookup = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| CompileError::UnknownNode(name.to_string()))
        };

        let entry_name = self.entry.as_deref().ok_or(CompileError::MissingEntryPoint)?;
        let entry = lookup(entry_name)?;

        let mut successors: Vec<Vec<Target>> = vec![Vec::new(); self.nodes.len()];
        for (from, to) in &self.edges {
            let from = lookup(from)?;
            let target = if to == END {
                Target::End
            } else {
                Target::Node(lookup(to)?)
            };
            successors[from].push(target);
        }

        if let Some((name, _)) = self
            .nodes
            .iter()
            .zip(&successors)
            .find_map(|(node, next)| next.is_empty().then_some(node))
        {
            return Err(CompileError::NoOutgoingEdge(name.clone()));
        }

        let nodes = self
            .nodes
            .into_iter()
            .zip(successors)
            .map(|((name, node), next)| CompiledNode { name, node, next })
            .collect();

        Ok(CompiledGraph {
            nodes,
            entry,
            step_limit: self.step_limit,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Node(usize),
    End,
}

struct CompiledNode<S: GraphState> {
    name: String,
    node: Arc<dyn Node<S>>,
    next: Vec<Target>,
}

impl<S: GraphState> Clone for CompiledNode<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            node: Arc::clone(&self.node),
            next: self.next.clone(),
        }
    }
}

/// Validated graph, ready to run. Indices are fixed at compile time.
pub struct CompiledGraph<S: GraphState> {
    nodes: Vec<CompiledNode<S>>,
    entry: usize,
    step_limit: usize,
}

impl<S: GraphState> Clone for CompiledGraph<S> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            entry: self.entry,
            step_limit: self.step_limit,
        }
    }
}

impl<S: GraphState> fmt::Debug for CompiledGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledGraph")
            .field(
                "nodes",
                &self.nodes.iter().map(|n| n.name.as_str()).collect::<Vec<_>>(),
            )
            .field("entry", &self.nodes[self.entry].name)
            .field("step_limit", &self.step_limit)
            .finish()
    }
}

impl<S: GraphState> CompiledGraph<S> {
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    /// Successor names of `node`, in edge order. [`END`] for the terminal.
    pub fn successors(&self, node: &str) -> Option<Vec<&str>> {
        let compiled = self.nodes.iter().find(|n| n.name == node)?;
        Some(
            compiled
                .next
                .iter()
                .map(|t| match t {
                    Target::Node(i) => self.nodes[*i].name.as_str(),
                    Target::End => END,
                })
                .collect(),
        )
    }

    /// Run from the entry point until every branch reached [`END`].
    ///
    /// Execution proceeds in supersteps: every node scheduled for a step runs
    /// once, in order, and the successors they name form the next step with
    /// duplicates collapsed. A join reached from several branches in the same
    /// step therefore runs once.
    pub async fn invoke(&self, initial: S) -> Result<S, GraphError> {
        let mut state = initial;
        let mut frontier = vec![self.entry];
        let mut steps = 0usize;

        while !frontier.is_empty() {
            let mut scheduled = vec![false; self.nodes.len()];
            let mut next = Vec::new();

            for idx in frontier {
                if steps == self.step_limit {
                    warn!(limit = self.step_limit, "graph step limit reached");
                    return Err(GraphError::StepLimitExceeded(self.step_limit));
                }
                steps += 1;

                let current = &self.nodes[idx];
                debug!(node = %current.name, step = steps, "running graph node");

                let update = current
                    .node
                    .run(&state)
                    .await
                    .map_err(|source| GraphError::NodeFailed {
                        node: current.name.clone(),
                        source,
                    })?;
                state.apply(update);

                for target in &current.next {
                    if let Target::Node(i) = *target {
                        if !scheduled[i] {
                            scheduled[i] = true;
                            next.push(i);
                        }
                    }
                }
            }

            frontier = next;
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test state: an append-only trace plus a last-writer value.
    #[derive(Debug, Clone, Default)]
    struct Trace {
        visited: Vec<String>,
        last: Option<String>,
    }

    struct Visit {
        name: &'static str,
    }

    impl GraphState for Trace {
        type Update = Visit;

        fn apply(&mut self, update: Visit) {
            self.visited.push(update.name.to_string());
            self.last = Some(update.name.to_string());
        }
    }

    fn visit(name: &'static str) -> impl Node<Trace> {
        node_fn(move |_state: Trace| async move { Ok(Visit { name }) })
    }

    #[tokio::test]
    async fn test_linear_graph_runs_in_edge_order() {
        let mut graph = StateGraph::new();
        graph
            .add_node("a", visit("a"))
            .add_node("b", visit("b"))
            .set_entry_point("a")
            .add_edge("a", "b")
            .add_edge("b", END);
        let compiled = graph.compile().unwrap();

        let out = compiled.invoke(Trace::default()).await.unwrap();
        assert_eq!(out.visited, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_successor_sees_merged_update() {
        let mut graph = StateGraph::new();
        graph
            .add_node("a", visit("a"))
            .add_node(
                "b",
                node_fn(|state: Trace| async move {
                    anyhow::ensure!(state.last.as_deref() == Some("a"), "a not merged yet");
                    Ok(Visit { name: "b" })
                }),
            )
            .set_entry_point("a")
            .add_edge("a", "b")
            .add_edge("b", END);

        let out = graph.compile().unwrap().invoke(Trace::default()).await.unwrap();
        assert_eq!(out.last.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_branches_run_breadth_first_in_insertion_order() {
        let mut graph = StateGraph::new();
        graph
            .add_node("root", visit("root"))
            .add_node("left", visit("left"))
            .add_node("right", visit("right"))
            .add_node("leaf", visit("leaf"))
            .set_entry_point("root")
            .add_edge("root", "left")
            .add_edge("root", "right")
            .add_edge("left", "leaf")
            .add_edge("right", END)
            .add_edge("leaf", END);

        let compiled = graph.compile().unwrap();
        assert_eq!(compiled.successors("root"), Some(vec!["left", "right"]));

        let out = compiled.invoke(Trace::default()).await.unwrap();
        assert_eq!(out.visited, vec!["root", "left", "right", "leaf"]);
    }

    #[tokio::test]
    async fn test_diamond_join_runs_once() {
        let mut graph = StateGraph::new();
        graph
            .add_node("root", visit("root"))
            .add_node("l", visit("l"))
            .add_node("r", visit("r"))
            .add_node("join", visit("join"))
            .set_entry_point("root")
            .add_edge("root", "l")
            .add_edge("root", "r")
            .add_edge("l", "join")
            .add_edge("r", "join")
            .add_edge("join", END);

        let out = graph.compile().unwrap().invoke(Trace::default()).await.unwrap();
        assert_eq!(out.visited, vec!["root", "l", "r", "join"]);
    }

    #[tokio::test]
    async fn test_stacked_diamonds_stay_within_step_limit() {
        const NAMES: [&str; 13] = [
            "j0", "l1", "r1", "j1", "l2", "r2", "j2", "l3", "r3", "j3", "l4", "r4", "j4",
        ];
        let mut graph = StateGraph::new();
        for name in NAMES {
            graph.add_node(name, visit(name));
        }
        graph.set_entry_point("j0");
        for level in 1..=4 {
            let prev = NAMES[(level - 1) * 3];
            let (l, r, join) = (NAMES[level * 3 - 2], NAMES[level * 3 - 1], NAMES[level * 3]);
            graph
                .add_edge(prev, l)
                .add_edge(prev, r)
                .add_edge(l, join)
                .add_edge(r, join);
        }
        graph.add_edge("j4", END);

        let out = graph.compile().unwrap().invoke(Trace::default()).await.unwrap();
        assert_eq!(out.visited, NAMES.to_vec());
    }

    #[tokio::test]
    async fn test_failing_node_halts_execution() {
        let after = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&after);

        let mut graph = StateGraph::new();
        graph
            .add_node(
                "boom",
                node_fn(|_state: Trace| async move {
                    Err::<Visit, _>(anyhow::anyhow!("backend exploded"))
                }),
            )
            .add_node(
                "after",
                node_fn(move |_state: Trace| {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(Visit { name: "after" })
                    }
                }),
            )
            .set_entry_point("boom")
            .add_edge("boom", "after")
            .add_edge("after", END);

        let err = graph
            .compile()
            .unwrap()
            .invoke(Trace::default())
            .await
            .unwrap_err();

        assert_eq!(err.failed_node(), Some("boom"));
        assert_eq!(err.to_string(), "node 'boom' failed: backend exploded");
        assert_eq!(after.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cycle_hits_step_limit() {
        let mut graph = StateGraph::new();
        graph
            .add_node("ping", visit("ping"))
            .add_node("pong", visit("pong"))
            .set_entry_point("ping")
            .add_edge("ping", "pong")
            .add_edge("pong", "ping")
            .with_step_limit(5);

        let err = graph
            .compile()
            .unwrap()
            .invoke(Trace::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::StepLimitExceeded(5)));
    }

    #[test]
    fn test_compile_requires_entry_point() {
        let mut graph = StateGraph::new();
        graph.add_node("a", visit("a")).add_edge("a", END);
        assert_eq!(graph.compile().unwrap_err(), CompileError::MissingEntryPoint);
    }

    #[test]
    fn test_compile_rejects_unknown_edge_target() {
        let mut graph = StateGraph::new();
        graph
            .add_node("a", visit("a"))
            .set_entry_point("a")
            .add_edge("a", "ghost");
        assert_eq!(
            graph.compile().unwrap_err(),
            CompileError::UnknownNode("ghost".into())
        );
    }

    #[test]
    fn test_compile_rejects_dead_end_node() {
        let mut graph = StateGraph::new();
        graph
            .add_node("a", visit("a"))
            .add_node("b", visit("b"))
            .set_entry_point("a")
            .add_edge("a", "b");
        assert_eq!(
            graph.compile().unwrap_err(),
            CompileError::NoOutgoingEdge("b".into())
        );
    }

    #[test]
    fn test_compile_rejects_duplicate_and_reserved_names() {
        let mut graph = StateGraph::new();
        graph.add_node("a", visit("a")).add_node("a", visit("a"));
        assert_eq!(
            graph.compile().unwrap_err(),
            CompileError::DuplicateNode("a".into())
        );

        let mut graph = StateGraph::new();
        graph.add_node(END, visit("end"));
        assert_eq!(
            graph.compile().unwrap_err(),
            CompileError::ReservedName(END.into())
        );
    }
}
