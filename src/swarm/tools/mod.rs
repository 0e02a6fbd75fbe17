// SPDX-License-Identifier: MIT

//! Tool handlers available to LLM-backed steps
//!
//! - [`FunctionTool`] - stands in for a function declared by an agent definition
//! - [`TypedTool`] - wraps a typed handler, deriving its schema from the argument type

mod function;
mod typed;

pub use function::FunctionTool;
pub use typed::{current_time_tool, CurrentTimeArgs, TypedTool};

use crate::adk::tool::Tool;
use crate::swarm::workflow::registry::ToolRegistry;
use std::sync::Arc;

/// Register the built-in tools
pub async fn register_builtins(registry: &ToolRegistry) {
    let tool = Arc::new(current_time_tool());
    log::info!("Registered tool: {}", tool.name());
    registry.register(tool).await;
}
