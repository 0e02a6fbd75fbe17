// SPDX-License-Identifier: MIT

//! HTTP transport
//!
//! - `GET  /api/health` - liveness
//! - `POST /api/executions` - run a request envelope, answer with the aggregate result
//! - `POST /api/executions/stream` - same envelope, answered as server-sent events

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::adk::error::SwarmError;
use crate::swarm::workflow::agent_factory::register_declared_functions;
use crate::swarm::workflow::graph::{TraversalEngine, TraversalResult};
use crate::swarm::workflow::registry::ToolRegistry;
use crate::swarm::workflow::stream::StreamEvent;
use crate::swarm::workflow::types::{PreparedRequest, WorkflowRequest};

const FRAME_BUFFER: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TraversalEngine>,
    pub registry: ToolRegistry,
}

impl AppState {
    pub fn new(engine: Arc<TraversalEngine>, registry: ToolRegistry) -> Self {
        Self { engine, registry }
    }

    async fn prepare(&self, request: WorkflowRequest) -> Result<PreparedRequest, ApiError> {
        let prepared = request.prepare()?;
        register_declared_functions(&self.registry, &prepared.graph).await;
        Ok(prepared)
    }
}

/// Error body `{"error", "kind"}` with a status derived from the error kind
pub enum ApiError {
    Swarm(SwarmError),
    /// Body that never became a [`WorkflowRequest`]
    Rejected(JsonRejection),
}

impl From<SwarmError> for ApiError {
    fn from(err: SwarmError) -> Self {
        Self::Swarm(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Rejected(rejection) => rejection.status(),
            Self::Swarm(SwarmError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Swarm(SwarmError::UnknownNode(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Swarm(SwarmError::StepExecution { .. }) => StatusCode::BAD_GATEWAY,
            Self::Swarm(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Swarm(err) => json!({ "error": err.to_string(), "kind": err.kind() }),
            Self::Rejected(rejection) => {
                json!({ "error": rejection.body_text(), "kind": "validation" })
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        log::error!("Execution failed ({}): {}", status, body["error"]);
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/executions", post(create_execution))
        .route("/api/executions/stream", post(stream_execution))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(port: u16, state: AppState) -> Result<(), SwarmError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn create_execution(
    State(state): State<AppState>,
    payload: Result<Json<WorkflowRequest>, JsonRejection>,
) -> Result<Json<TraversalResult>, ApiError> {
    let Json(request) = payload?;
    let prepared = state.prepare(request).await?;
    let result = state
        .engine
        .run(&prepared.graph, &prepared.input, &prepared.context)
        .await?;
    Ok(Json(result))
}

async fn stream_execution(
    State(state): State<AppState>,
    payload: Result<Json<WorkflowRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let Json(request) = payload?;
    let prepared = state.prepare(request).await?;
    let (tx, rx) = mpsc::channel::<StreamEvent>(FRAME_BUFFER);

    tokio::spawn(async move {
        log::info!(
            "Starting streaming execution at '{}'",
            prepared.graph.entry_node()
        );
        if let Err(e) = state
            .engine
            .run_stream(&prepared.graph, &prepared.input, &prepared.context, tx)
            .await
        {
            log::error!("Streaming execution failed: {}", e);
        }
    });

    let stream = ReceiverStream::new(rx).map(|event| Event::default().json_data(event));
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(1))))
}
