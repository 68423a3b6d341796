//! # Pipeline State
//!
//! Key-value carrier threaded through the review graph. Created with only
//! `input`; each node adds its own output key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::graph::GraphState;

pub const INPUT: &str = "input";
pub const ARCHITECT_OUTPUT: &str = "architect_output";
pub const REVIEWER_OUTPUT: &str = "reviewer_output";

/// State of one graph invocation. Owned by exactly one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineState(Map<String, Value>);

impl PipelineState {
    pub fn new(input: impl Into<String>) -> Self {
        let mut values = Map::new();
        values.insert(INPUT.to_string(), Value::String(input.into()));
        Self(values)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// String value of `key`; `None` when missing, null, or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn input(&self) -> Option<&str> {
        self.get_str(INPUT)
    }

    pub fn architect_output(&self) -> Option<&str> {
        self.get_str(ARCHITECT_OUTPUT)
    }

    pub fn reviewer_output(&self) -> Option<&str> {
        self.get_str(REVIEWER_OUTPUT)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Partial update returned by a graph node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate(Map<String, Value>);

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl GraphState for PipelineState {
    type Update = StateUpdate;

    /// Key-wise overwrite; keys are never removed.
    fn apply(&mut self, update: StateUpdate) {
        for (key, value) in update.0 {
            self.0.insert(key, value);
        }
    }
}
