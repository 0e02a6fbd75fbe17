// SPDX-License-Identifier: MIT

//! Graph traversal engine
//!
//! Walks a [`Graph`] from its entry node towards its exit node, one node at a
//! time. Each executed node's output becomes the next node's input; the exit
//! node itself is never executed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use super::types::Graph;
use crate::adk::error::SwarmError;
use crate::swarm::workflow::conversation::{ConversationLog, Message};
use crate::swarm::workflow::step::StepExecutor;
use crate::swarm::workflow::stream::{StreamEmitter, StreamEvent};
use crate::swarm::workflow::types::ExecutionContext;

/// Assistant turn recorded when no node produced anything
pub const NO_OUTPUT: &str = "No output generated";

/// Whether conversation turns survive across traversals on one engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Every traversal starts from an empty log
    #[default]
    Fresh,
    /// One log per engine; traversals on the same engine run one at a time
    Persistent,
}

impl FromStr for HistoryMode {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fresh" => Ok(Self::Fresh),
            "persistent" => Ok(Self::Persistent),
            other => Err(SwarmError::config(format!("unknown history mode: {}", other))),
        }
    }
}

/// Aggregate outcome of one traversal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraversalResult {
    pub messages: Vec<Message>,
    pub node_outputs: BTreeMap<String, String>,
    pub final_node_id: String,
    /// False when the walk stopped early at a dead end
    #[serde(skip)]
    pub reached_exit: bool,
}

impl TraversalResult {
    /// Content of the final assistant turn
    pub fn final_output(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }
}

/// Drives a step executor over a graph
pub struct TraversalEngine {
    executor: Arc<dyn StepExecutor>,
    history: HistoryMode,
    log: Mutex<ConversationLog>,
}

impl TraversalEngine {
    pub fn new(executor: Arc<dyn StepExecutor>) -> Self {
        Self::with_history(executor, HistoryMode::Fresh)
    }

    pub fn with_history(executor: Arc<dyn StepExecutor>, history: HistoryMode) -> Self {
        Self {
            executor,
            history,
            log: Mutex::new(ConversationLog::new()),
        }
    }

    /// Turns accumulated by a persistent engine (empty in fresh mode)
    pub async fn history(&self) -> Vec<Message> {
        self.log.lock().await.snapshot()
    }

    /// Run a traversal and return the aggregate result
    pub async fn run(
        &self,
        graph: &Graph,
        input: &str,
        context: &ExecutionContext,
    ) -> Result<TraversalResult, SwarmError> {
        self.traverse(graph, input, context, None).await
    }

    /// Run a traversal, sending frames to `tx` as it goes.
    ///
    /// The stream opens with a start frame and closes with either an end
    /// frame carrying the conversation or an error frame. Frames already
    /// sent are never retracted.
    pub async fn run_stream(
        &self,
        graph: &Graph,
        input: &str,
        context: &ExecutionContext,
        tx: mpsc::Sender<StreamEvent>,
    ) -> Result<TraversalResult, SwarmError> {
        let emitter = StreamEmitter::new(tx);
        emitter.start().await;

        match self.traverse(graph, input, context, Some(&emitter)).await {
            Ok(result) => {
                emitter
                    .end(result.messages.clone(), &result.final_node_id)
                    .await;
                Ok(result)
            }
            Err(e) => {
                emitter.error(&e).await;
                Err(e)
            }
        }
    }

    async fn traverse(
        &self,
        graph: &Graph,
        input: &str,
        context: &ExecutionContext,
        emitter: Option<&StreamEmitter>,
    ) -> Result<TraversalResult, SwarmError> {
        match self.history {
            HistoryMode::Fresh => {
                let mut conversation = ConversationLog::new();
                self.walk(graph, input, context, &mut conversation, emitter)
                    .await
            }
            HistoryMode::Persistent => {
                let mut conversation = self.log.lock().await;
                self.walk(graph, input, context, &mut conversation, emitter)
                    .await
            }
        }
    }

    async fn walk(
        &self,
        graph: &Graph,
        input: &str,
        context: &ExecutionContext,
        conversation: &mut ConversationLog,
        emitter: Option<&StreamEmitter>,
    ) -> Result<TraversalResult, SwarmError> {
        let execution_id = Uuid::new_v4();
        log::info!(
            "[{}] Starting traversal at '{}' (exit '{}', executor '{}')",
            execution_id,
            graph.entry_node(),
            graph.exit_node(),
            self.executor.name()
        );

        conversation.push_user(input);

        let mut current_id = graph.entry_node().to_string();
        let mut current_input = input.to_string();
        let mut node_outputs: BTreeMap<String, String> = BTreeMap::new();

        while current_id != graph.exit_node() {
            let node = graph
                .node(&current_id)
                .ok_or_else(|| SwarmError::UnknownNode(current_id.clone()))?;

            if let Some(emitter) = emitter {
                emitter.node_entered(node).await;
            }

            log::info!("[{}] Executing node: {}", execution_id, node.id);
            let output = self
                .executor
                .execute(node, &current_input, context)
                .await
                .map_err(|e| {
                    log::error!("[{}] Node {} failed: {}", execution_id, node.id, e);
                    SwarmError::step(&node.id, e)
                })?;

            if let Some(emitter) = emitter {
                emitter.content(&current_id, &output).await;
            }
            node_outputs.insert(current_id.clone(), output.clone());

            let next_id = match graph.next_node(&current_id) {
                None => {
                    log::warn!(
                        "[{}] Dead end at '{}': no outgoing edge",
                        execution_id,
                        current_id
                    );
                    break;
                }
                Some(next) if node_outputs.contains_key(next) => {
                    log::warn!(
                        "[{}] Edge {} -> {} revisits an executed node; stopping",
                        execution_id,
                        current_id,
                        next
                    );
                    break;
                }
                Some(next) => next.to_string(),
            };

            current_id = next_id;
            current_input = output;
        }

        let reached_exit = current_id == graph.exit_node();
        let final_output = node_outputs
            .get(graph.exit_node())
            .or_else(|| node_outputs.get(&current_id))
            .cloned()
            // reaching the exit leaves the last output as the pending input
            .or_else(|| (!node_outputs.is_empty()).then_some(current_input))
            .unwrap_or_else(|| NO_OUTPUT.to_string());
        conversation.push_assistant(final_output);

        log::info!(
            "[{}] Traversal finished at '{}' after {} node(s){}",
            execution_id,
            current_id,
            node_outputs.len(),
            if reached_exit { "" } else { " (dead end)" }
        );

        Ok(TraversalResult {
            messages: conversation.snapshot(),
            node_outputs,
            final_node_id: current_id,
            reached_exit,
        })
    }
}
