// SPDX-License-Identifier: MIT

//! LLM-backed step executor
//!
//! Sends the node agent's instructions and the node input to a model and
//! resolves tool calls in a loop until a text answer comes back.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::StepExecutor;
use crate::adk::error::{BoxError, SwarmError};
use crate::adk::model::{Content, GenerationConfig, Model, ModelRole, Part};
use crate::adk::tool::Tool;
use crate::swarm::workflow::graph::Node;
use crate::swarm::workflow::registry::ToolRegistry;
use crate::swarm::workflow::types::ExecutionContext;

const DEFAULT_INSTRUCTIONS: &str = "You are a helpful agent.";

pub struct LlmStepExecutor {
    model: Arc<dyn Model>,
    registry: ToolRegistry,
    max_turns: u32,
    generation: GenerationConfig,
}

impl LlmStepExecutor {
    pub fn new(model: Arc<dyn Model>, registry: ToolRegistry, max_turns: u32) -> Self {
        Self {
            model,
            registry,
            max_turns,
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    fn initial_history(node: &Node, input: &str, context: &ExecutionContext) -> Vec<Content> {
        let instructions = match node.agent.instructions().trim() {
            "" => DEFAULT_INSTRUCTIONS,
            _ => node.agent.instructions(),
        };

        let mut history = vec![Content::text(ModelRole::System, instructions)];
        if !context.is_empty() {
            history.push(Content::text(
                ModelRole::System,
                format!(
                    "Context variables: {}",
                    serde_json::to_string(context.as_map()).unwrap_or_default()
                ),
            ));
        }
        history.push(Content::text(ModelRole::User, input));
        history
    }

    async fn call_tool(
        tools: &[Arc<dyn Tool>],
        name: &str,
        args: serde_json::Value,
    ) -> serde_json::Value {
        let Some(tool) = tools.iter().find(|t| t.name() == name) else {
            log::error!("Tool {} not bound to this agent", name);
            return json!({ "error": SwarmError::tool_not_found(name).to_string() });
        };

        match tool.execute(args).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Tool {} failed: {}", name, e);
                json!({ "error": e.to_string() })
            }
        }
    }
}

#[async_trait]
impl StepExecutor for LlmStepExecutor {
    fn name(&self) -> &str {
        "llm"
    }

    async fn execute(
        &self,
        node: &Node,
        input: &str,
        context: &ExecutionContext,
    ) -> Result<String, BoxError> {
        let tools = self.registry.resolve(&node.agent.tool_names()).await;
        let mut generation = self.generation.clone();
        if node.agent.model.is_some() {
            generation.model = node.agent.model.clone();
        }

        let mut history = Self::initial_history(node, input, context);

        for turn in 0..self.max_turns {
            log::info!(
                "Agent {} turn {}/{}",
                node.agent.display_name(),
                turn + 1,
                self.max_turns
            );
            let response = self
                .model
                .generate_content(&history, Some(&generation), Some(tools.as_slice()))
                .await?;

            let calls: Vec<(String, String, serde_json::Value)> = response
                .parts
                .iter()
                .filter_map(|part| match part {
                    Part::FunctionCall { id, name, args } => {
                        Some((id.clone(), name.clone(), args.clone()))
                    }
                    _ => None,
                })
                .collect();

            if calls.is_empty() {
                let text = response.joined_text();
                if text.is_empty() {
                    log::warn!(
                        "Agent {} returned an empty response",
                        node.agent.display_name()
                    );
                }
                return Ok(text);
            }

            let mut responses = Vec::with_capacity(calls.len());
            for (id, name, args) in calls {
                log::info!("Tool call: {} {}", name, args);
                let result = Self::call_tool(&tools, &name, args).await;
                responses.push(Part::FunctionResponse {
                    id,
                    name,
                    response: result,
                });
            }

            history.push(response);
            history.push(Content {
                role: ModelRole::Tool,
                parts: responses,
            });
        }

        Err(SwarmError::MaxIterations {
            kind: "turns".to_string(),
            limit: self.max_turns,
        }
        .into())
    }
}
