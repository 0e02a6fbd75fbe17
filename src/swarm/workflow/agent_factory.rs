// SPDX-License-Identifier: MIT

//! Agent factory - turns configuration and agent definitions into callables
//!
//! Declared functions become registry entries at load time; the configured
//! executor kind decides which [`StepExecutor`] serves every node.

use std::sync::Arc;

use crate::adk::error::SwarmError;
use crate::adk::model::openai::ChatCompletionsModel;
use crate::adk::model::Model;
use crate::swarm::config::{ExecutorKind, SwarmConfig};
use crate::swarm::tools::{register_builtins, FunctionTool};
use crate::swarm::workflow::graph::{Graph, TraversalEngine};
use crate::swarm::workflow::registry::ToolRegistry;
use crate::swarm::workflow::step::{EchoStepExecutor, LlmStepExecutor, StepExecutor};

/// Register a handler for every function declared by the graph's agents.
///
/// Names already in the registry keep their existing handler. Returns the
/// number of handlers added.
pub async fn register_declared_functions(registry: &ToolRegistry, graph: &Graph) -> usize {
    let mut added = 0;
    for node in graph.nodes() {
        for function in &node.agent.functions {
            let tool = Arc::new(FunctionTool::new(function.clone()));
            if registry.register_if_absent(tool).await {
                log::info!(
                    "Registered declared function '{}' for agent '{}'",
                    function.name,
                    node.agent.display_name()
                );
                added += 1;
            } else {
                log::debug!("Function '{}' already registered", function.name);
            }
        }
    }
    added
}

/// Builds the step executor selected by configuration
pub struct ExecutorFactory<'a> {
    config: &'a SwarmConfig,
    registry: &'a ToolRegistry,
}

impl<'a> ExecutorFactory<'a> {
    pub fn new(config: &'a SwarmConfig, registry: &'a ToolRegistry) -> Self {
        Self { config, registry }
    }

    pub fn build(&self) -> Result<Arc<dyn StepExecutor>, SwarmError> {
        log::info!("Building step executor: {:?}", self.config.executor);
        match self.config.executor {
            ExecutorKind::Echo => Ok(Arc::new(EchoStepExecutor)),
            ExecutorKind::Llm => {
                let model = self.create_model()?;
                Ok(Arc::new(
                    LlmStepExecutor::new(model, self.registry.clone(), self.config.max_turns)
                        .with_generation(self.config.generation_config()),
                ))
            }
        }
    }

    fn create_model(&self) -> Result<Arc<dyn Model>, SwarmError> {
        log::debug!(
            "Using model '{}' at {}",
            self.config.model_name,
            self.config.base_url
        );
        let model = ChatCompletionsModel::new(
            self.config.model_name.clone(),
            self.config.base_url.clone(),
            self.config.api_key.clone(),
        )
        .map_err(|e| SwarmError::config(e.to_string()))?;
        Ok(Arc::new(model))
    }
}

/// Register the built-in tools and build an engine around the configured executor
pub async fn build_engine(
    config: &SwarmConfig,
    registry: &ToolRegistry,
) -> Result<Arc<TraversalEngine>, SwarmError> {
    register_builtins(registry).await;
    let executor = ExecutorFactory::new(config, registry).build()?;
    Ok(Arc::new(TraversalEngine::with_history(
        executor,
        config.history,
    )))
}
