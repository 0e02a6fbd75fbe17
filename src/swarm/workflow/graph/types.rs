// SPDX-License-Identifier: MIT

//! Graph workflow type definitions
//!
//! [`GraphDefinition`] is the wire shape; [`Graph`] is the validated,
//! immutable form the engine walks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::adk::error::ValidationError;
use crate::swarm::workflow::types::AgentSpec;

/// A graph as declared in a request
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GraphDefinition {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub entry_node: Option<String>,
    #[serde(default)]
    pub exit_node: Option<String>,
}

/// One step in the workflow
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Node {
    pub id: String,
    #[serde(default, skip_serializing_if = "AgentSpec::is_unset")]
    pub agent: AgentSpec,
}

impl Node {
    pub fn new(id: impl Into<String>, agent: AgentSpec) -> Self {
        Self {
            id: id.into(),
            agent,
        }
    }
}

/// Directed link between two node ids.
///
/// Endpoints are not checked against the node mapping.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Validated, immutable workflow graph
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: HashMap<String, Node>,
    edges: Vec<Edge>,
    entry_node: String,
    exit_node: String,
}

impl Graph {
    /// Build a graph from its parts.
    ///
    /// Fails only when the node list is empty or an entry/exit id is empty.
    /// Whether edges resolve, or whether any path reaches the exit, is left
    /// for the traversal to discover.
    pub fn new(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        entry_node: impl Into<String>,
        exit_node: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::from_definition(GraphDefinition {
            nodes,
            edges,
            entry_node: Some(entry_node.into()),
            exit_node: Some(exit_node.into()),
        })
    }

    pub fn from_definition(def: GraphDefinition) -> Result<Self, ValidationError> {
        validate(&def)?;

        let mut nodes = HashMap::with_capacity(def.nodes.len());
        for node in def.nodes {
            if let Some(previous) = nodes.insert(node.id.clone(), node) {
                log::warn!(
                    "Duplicate node id '{}': later declaration replaces the earlier one",
                    previous.id
                );
            }
        }

        Ok(Self {
            nodes,
            edges: def.edges,
            // validate() guarantees both are present
            entry_node: def.entry_node.unwrap_or_default(),
            exit_node: def.exit_node.unwrap_or_default(),
        })
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Target of the first declared edge leaving `from`
    pub fn next_node(&self, from: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|e| e.from == from)
            .map(|e| e.to.as_str())
    }

    pub fn entry_node(&self) -> &str {
        &self.entry_node
    }

    pub fn exit_node(&self) -> &str {
        &self.exit_node
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Check the construction-time invariants of a graph definition
pub fn validate(def: &GraphDefinition) -> Result<(), ValidationError> {
    let missing = |id: &Option<String>| id.as_deref().map_or(true, str::is_empty);

    if def.nodes.is_empty() || missing(&def.entry_node) || missing(&def.exit_node) {
        return Err(ValidationError::MissingEntryOrExit);
    }
    Ok(())
}
