// SPDX-License-Identifier: MIT

//! Streaming events and the emitter that frames them
//!
//! One traversal in streaming mode produces, in order:
//! `{"delim":"start"}`, then per executed node a `{"node", "node_id"}` frame
//! followed by its `{"content", "node_id"}` chunks, then either
//! `{"delim":"end", "response": {...}}` or a terminating `{"error"}` frame.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::conversation::Message;
use super::graph::Node;
use crate::adk::error::SwarmError;

/// Separator between delivery units of a node's output
pub const SEGMENT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Delim {
    Start,
    End,
}

/// Payload of the end frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamResponse {
    pub messages: Vec<Message>,
    pub final_node_id: String,
}

/// One independently parsable frame of a streamed traversal.
///
/// Untagged: the field set decides the variant. `End` is listed before
/// `Start` so an end frame never deserializes as a start frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StreamEvent {
    End {
        delim: Delim,
        response: StreamResponse,
    },
    Start {
        delim: Delim,
    },
    NodeEntered {
        node: Node,
        node_id: String,
    },
    Content {
        content: String,
        node_id: String,
    },
    Error {
        error: String,
        kind: String,
    },
}

impl StreamEvent {
    pub fn start() -> Self {
        Self::Start { delim: Delim::Start }
    }

    pub fn end(messages: Vec<Message>, final_node_id: impl Into<String>) -> Self {
        Self::End {
            delim: Delim::End,
            response: StreamResponse {
                messages,
                final_node_id: final_node_id.into(),
            },
        }
    }

    pub fn error(err: &SwarmError) -> Self {
        Self::Error {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }

    /// True for the frames that close a stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End { .. } | Self::Error { .. })
    }
}

/// Split a node's output into delivery units.
///
/// Empty segments are dropped; every unit keeps the separator.
pub fn chunk_output(output: &str) -> Vec<String> {
    output
        .split(SEGMENT_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("{}{}", segment, SEGMENT_SEPARATOR))
        .collect()
}

/// Single-producer side of a streamed traversal.
///
/// A closed receiver means the transport was severed; frames are then
/// dropped and the traversal carries on.
#[derive(Debug, Clone)]
pub struct StreamEmitter {
    tx: mpsc::Sender<StreamEvent>,
}

impl StreamEmitter {
    pub fn new(tx: mpsc::Sender<StreamEvent>) -> Self {
        Self { tx }
    }

    pub async fn emit(&self, event: StreamEvent) {
        if self.tx.send(event).await.is_err() {
            log::debug!("Stream receiver dropped; discarding frame");
        }
    }

    pub async fn start(&self) {
        self.emit(StreamEvent::start()).await;
    }

    pub async fn node_entered(&self, node: &Node) {
        self.emit(StreamEvent::NodeEntered {
            node: node.clone(),
            node_id: node.id.clone(),
        })
        .await;
    }

    pub async fn content(&self, node_id: &str, output: &str) {
        for chunk in chunk_output(output) {
            self.emit(StreamEvent::Content {
                content: chunk,
                node_id: node_id.to_string(),
            })
            .await;
        }
    }

    pub async fn end(&self, messages: Vec<Message>, final_node_id: &str) {
        self.emit(StreamEvent::end(messages, final_node_id)).await;
    }

    pub async fn error(&self, err: &SwarmError) {
        self.emit(StreamEvent::error(err)).await;
    }
}
