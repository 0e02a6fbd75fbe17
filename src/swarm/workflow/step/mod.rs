// SPDX-License-Identifier: MIT

//! Step executors - turn (node, input, context) into a node's output
//!
//! - `EchoStepExecutor` - deterministic `"<id>:<input>"`, for dry runs
//! - `LlmStepExecutor` - calls a language model, resolving tool calls

mod llm;

pub use llm::LlmStepExecutor;

use async_trait::async_trait;

use super::graph::Node;
use super::types::ExecutionContext;
use crate::adk::error::BoxError;

/// Pluggable capability invoked once per executed node
#[async_trait]
pub trait StepExecutor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn execute(
        &self,
        node: &Node,
        input: &str,
        context: &ExecutionContext,
    ) -> Result<String, BoxError>;
}

/// Echoes `"<node id>:<input>"` without calling anything
#[derive(Debug, Default, Clone)]
pub struct EchoStepExecutor;

#[async_trait]
impl StepExecutor for EchoStepExecutor {
    fn name(&self) -> &str {
        "echo"
    }

    async fn execute(
        &self,
        node: &Node,
        input: &str,
        _context: &ExecutionContext,
    ) -> Result<String, BoxError> {
        Ok(format!("{}:{}", node.id, input))
    }
}
