// SPDX-License-Identifier: MIT

//! Stdin/stdout bridge
//!
//! Reads one request envelope and answers on the writer: a single JSON
//! response line, or one JSON frame per line when the request asks to
//! stream. Frames are flushed as they are produced.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::adk::error::SwarmError;
use crate::swarm::config::SwarmConfig;
use crate::swarm::workflow::agent_factory::{build_engine, register_declared_functions};
use crate::swarm::workflow::graph::{TraversalEngine, TraversalResult};
use crate::swarm::workflow::loader::WorkflowLoader;
use crate::swarm::workflow::registry::ToolRegistry;
use crate::swarm::workflow::stream::StreamEvent;
use crate::swarm::workflow::types::WorkflowRequest;

const FRAME_BUFFER: usize = 64;

pub struct Bridge {
    engine: Arc<TraversalEngine>,
    registry: ToolRegistry,
}

impl Bridge {
    pub fn new(engine: Arc<TraversalEngine>, registry: ToolRegistry) -> Self {
        Self { engine, registry }
    }

    /// Read a whole JSON envelope from `reader`
    pub async fn read_request<R>(reader: &mut R) -> Result<WorkflowRequest, SwarmError>
    where
        R: AsyncRead + Unpin,
    {
        let mut raw = String::new();
        reader.read_to_string(&mut raw).await?;
        log::debug!("Received request ({} bytes)", raw.len());
        WorkflowLoader::parse_json(&raw)
    }

    /// Execute one request, writing its response to `writer`.
    ///
    /// In streaming mode a failure is also written as a terminating error
    /// frame before the error is returned.
    pub async fn handle<W>(
        &self,
        request: WorkflowRequest,
        writer: &mut W,
    ) -> Result<TraversalResult, SwarmError>
    where
        W: AsyncWrite + Unpin,
    {
        let prepared = request.prepare()?;
        register_declared_functions(&self.registry, &prepared.graph).await;

        if !prepared.stream {
            let result = self
                .engine
                .run(&prepared.graph, &prepared.input, &prepared.context)
                .await?;
            write_line(writer, &result).await?;
            return Ok(result);
        }

        let (tx, mut rx) = mpsc::channel::<StreamEvent>(FRAME_BUFFER);
        let traversal =
            self.engine
                .run_stream(&prepared.graph, &prepared.input, &prepared.context, tx);
        let forward = async {
            while let Some(event) = rx.recv().await {
                write_line(writer, &event).await?;
            }
            Ok::<(), SwarmError>(())
        };

        let (result, forwarded) = tokio::join!(traversal, forward);
        forwarded?;
        result
    }
}

/// One-shot pipeline behind `swarm-graph run`.
///
/// Reads the envelope from `file` when given, otherwise from `reader`, then
/// builds the engine and answers on `writer`. Every failure along the way
/// comes back as the returned error.
pub async fn run_once<R, W>(
    config: &SwarmConfig,
    registry: ToolRegistry,
    file: Option<&Path>,
    reader: &mut R,
    writer: &mut W,
) -> Result<TraversalResult, SwarmError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let request = match file {
        Some(path) => WorkflowLoader::new().load(path)?,
        None => Bridge::read_request(reader).await?,
    };
    let engine = build_engine(config, &registry).await?;
    Bridge::new(engine, registry).handle(request, writer).await
}

/// The single JSON line written to stderr when a run fails
pub fn error_envelope(err: &SwarmError) -> String {
    json!({ "error": err.to_string() }).to_string()
}

async fn write_line<W, T>(writer: &mut W, value: &T) -> Result<(), SwarmError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}
