// SPDX-License-Identifier: MIT

//! Request envelope and agent descriptor types
//!
//! These mirror the JSON accepted on stdin and over HTTP:
//!
//! ```json
//! {
//!   "workflow": { "graph": { "nodes": [...], "edges": [...],
//!                            "entryNode": "a", "exitNode": "c" } },
//!   "input": "hello",
//!   "context_variables": {},
//!   "stream": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::graph::{Graph, GraphDefinition};
use crate::adk::error::{SwarmError, ValidationError};

/// Top-level request consumed once per invocation
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WorkflowRequest {
    pub workflow: Option<Workflow>,
    pub input: Option<String>,
    #[serde(default)]
    pub context_variables: ExecutionContext,
    #[serde(default)]
    pub stream: bool,
}

/// A named workflow wrapping its graph
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Workflow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub graph: GraphDefinition,
}

/// A request whose workflow and input have been checked
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub graph: Graph,
    pub input: String,
    pub context: ExecutionContext,
    pub stream: bool,
}

impl WorkflowRequest {
    /// Check required fields and validate the graph.
    ///
    /// Nothing executes until this succeeds.
    pub fn prepare(self) -> Result<PreparedRequest, SwarmError> {
        let workflow = self.workflow.ok_or(ValidationError::MissingWorkflow)?;
        let input = self.input.ok_or(ValidationError::MissingInput)?;
        let graph = Graph::from_definition(workflow.graph)?;

        Ok(PreparedRequest {
            graph,
            input,
            context: self.context_variables,
            stream: self.stream,
        })
    }
}

/// Opaque agent capability attached to a node.
///
/// Re-serializes exactly the keys it was given; the engine reads nothing
/// but the name. Unknown keys are preserved in `extra`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct AgentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Per-agent model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Functions declared inline; registered as tools at load time
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDefinition>,
    /// Names of already-registered tools this agent may call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Name reported for agents declared without one
pub const UNKNOWN_AGENT: &str = "Unknown Agent";

impl AgentSpec {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            instructions: Some(instructions.into()),
            ..Default::default()
        }
    }

    /// Name for logs and prompts, [`UNKNOWN_AGENT`] when undeclared
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_AGENT)
    }

    pub fn instructions(&self) -> &str {
        self.instructions.as_deref().unwrap_or_default()
    }

    /// True when nothing at all was declared
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }

    /// Every tool name this agent may call, declared functions first
    pub fn tool_names(&self) -> Vec<&str> {
        self.functions
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.tools.iter().map(String::as_str))
            .collect()
    }
}

/// A function declared by an external agent definition
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object_schema")]
    pub parameters: Value,
}

fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

/// Caller-owned key/value context handed to every step
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(transparent)]
pub struct ExecutionContext(Map<String, Value>);

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ExecutionContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
