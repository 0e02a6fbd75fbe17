// SPDX-License-Identifier: MIT

//! Typed error handling for swarm-graph
//!
//! Trait seams (step executors, models, tools) return boxed errors; the
//! traversal engine and the transports convert them into [`SwarmError`].

use thiserror::Error;

/// Boxed error returned across trait boundaries
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type for swarm-graph
#[derive(Debug, Error)]
pub enum SwarmError {
    /// Malformed graph or request, reported before any node executes
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Traversal reached a node id absent from the node mapping
    #[error("Node {0} not found in workflow")]
    UnknownNode(String),

    /// The step executor failed while processing a node
    #[error("Step execution failed at node '{node_id}': {source}")]
    StepExecution {
        node_id: String,
        #[source]
        source: BoxError,
    },

    /// API errors from the language-model backend
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Tool not found during execution
    #[error("Tool '{name}' not found")]
    ToolNotFound { name: String },

    /// Configuration errors (missing env vars, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Max iterations/turns reached
    #[error("Max {kind} reached: {limit}")]
    MaxIterations { kind: String, limit: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Request and graph validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Entry or exit id is empty, or the graph has no nodes
    #[error("Invalid workflow: missing nodes or entry/exit points")]
    MissingEntryOrExit,

    /// The request carries no input text
    #[error("Input is required")]
    MissingInput,

    /// The request carries no workflow
    #[error("Workflow is required")]
    MissingWorkflow,
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),
}

impl SwarmError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a tool not found error
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wrap a step executor failure for the given node
    pub fn step(node_id: impl Into<String>, source: BoxError) -> Self {
        Self::StepExecution {
            node_id: node_id.into(),
            source,
        }
    }

    /// Short machine-readable kind, used in error frames
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::UnknownNode(_) => "unknown_node",
            Self::StepExecution { .. } => "step_execution",
            Self::Api { .. } => "api",
            Self::ToolNotFound { .. } => "tool_not_found",
            Self::Config(_) => "config",
            Self::MaxIterations { .. } => "max_iterations",
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) | Self::Http(_) => "internal",
        }
    }
}
