// SPDX-License-Identifier: MIT

//! Integration tests for workflow loading and graph traversal
//!
//! These tests drive the public API end to end using mock components.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use swarm_graph::adk::error::{BoxError, SwarmError, ValidationError};
use swarm_graph::adk::model::{Content, GenerationConfig, Model, ModelRole, Part};
use swarm_graph::adk::tool::Tool;
use swarm_graph::swarm::bridge::Bridge;
use swarm_graph::swarm::tools::register_builtins;
use swarm_graph::swarm::workflow::agent_factory::register_declared_functions;
use swarm_graph::swarm::workflow::conversation::Role;
use swarm_graph::swarm::workflow::graph::{
    Edge, Graph, HistoryMode, Node, TraversalEngine, NO_OUTPUT,
};
use swarm_graph::swarm::workflow::loader::WorkflowLoader;
use swarm_graph::swarm::workflow::registry::ToolRegistry;
use swarm_graph::swarm::workflow::step::{EchoStepExecutor, LlmStepExecutor, StepExecutor};
use swarm_graph::swarm::workflow::stream::StreamEvent;
use swarm_graph::swarm::workflow::types::{AgentSpec, ExecutionContext};

// ============================================================================
// Mock Components
// ============================================================================

/// Canned per-role answers keyed on the agent name, with optional latency
struct RoleMockExecutor {
    delay: Duration,
    calls: AtomicUsize,
}

impl RoleMockExecutor {
    fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StepExecutor for RoleMockExecutor {
    fn name(&self) -> &str {
        "role-mock"
    }

    async fn execute(
        &self,
        node: &Node,
        input: &str,
        _context: &ExecutionContext,
    ) -> Result<String, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let name = node.agent.display_name();
        let out = if name.contains("Understanding") {
            format!("I understand you're asking about: {}\n\nThis is a request.", input)
        } else if name.contains("Planning") {
            "Here's my plan:\n\n1. Research\n2. Synthesize".to_string()
        } else if name.contains("Review") {
            "In conclusion:\n\nDone.".to_string()
        } else {
            format!("Processing {} with {}...", input, name)
        };
        Ok(out)
    }
}

/// Fails every call
struct BrokenExecutor;

#[async_trait]
impl StepExecutor for BrokenExecutor {
    fn name(&self) -> &str {
        "broken"
    }

    async fn execute(
        &self,
        _node: &Node,
        _input: &str,
        _context: &ExecutionContext,
    ) -> Result<String, BoxError> {
        Err("rate limited by upstream".into())
    }
}

/// Mock model that returns predefined responses
struct MockModel {
    responses: Vec<Content>,
    response_index: AtomicUsize,
}

impl MockModel {
    fn new(responses: Vec<Content>) -> Self {
        Self {
            responses,
            response_index: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Model for MockModel {
    async fn generate_content(
        &self,
        _history: &[Content],
        _config: Option<&GenerationConfig>,
        _tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content, BoxError> {
        let idx = self.response_index.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(idx)
            .cloned()
            .ok_or_else(|| "No more mock responses".into())
    }
}

static MOCK_SCHEMA: Lazy<Value> = Lazy::new(|| json!({ "type": "object", "properties": {} }));

/// Mock tool that counts its calls
struct CountingTool {
    calls: AtomicUsize,
}

#[async_trait]
impl Tool for CountingTool {
    fn name(&self) -> &str {
        "counter"
    }

    fn description(&self) -> &str {
        "Counts calls"
    }

    fn schema(&self) -> &Value {
        &MOCK_SCHEMA
    }

    async fn execute(&self, _args: Value) -> Result<Value, BoxError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(json!({ "count": n }))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn agent_node(id: &str, agent: &str) -> Node {
    Node::new(id, AgentSpec::new(agent, format!("You are the {}.", agent)))
}

fn research_graph() -> Graph {
    Graph::new(
        vec![
            agent_node("understand", "Understanding Agent"),
            agent_node("plan", "Planning Agent"),
            agent_node("review", "Review Agent"),
        ],
        vec![
            Edge::new("understand", "plan"),
            Edge::new("plan", "review"),
        ],
        "understand",
        "review",
    )
    .unwrap()
}

async fn collect(mut rx: mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut frames = Vec::new();
    while let Some(frame) = rx.recv().await {
        frames.push(frame);
    }
    frames
}

// ============================================================================
// Traversal Tests
// ============================================================================

#[tokio::test]
async fn test_linear_echo_scenario() {
    let graph = Graph::new(
        vec![
            Node::new("A", AgentSpec::default()),
            Node::new("B", AgentSpec::default()),
            Node::new("C", AgentSpec::default()),
        ],
        vec![Edge::new("A", "B"), Edge::new("B", "C")],
        "A",
        "C",
    )
    .unwrap();
    let engine = TraversalEngine::new(Arc::new(EchoStepExecutor));

    let result = engine
        .run(&graph, "hello", &ExecutionContext::new())
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "messages": [
                { "role": "user", "content": "hello" },
                { "role": "assistant", "content": "B:A:hello" }
            ],
            "node_outputs": { "A": "A:hello", "B": "B:A:hello" },
            "final_node_id": "C"
        })
    );
}

#[tokio::test]
async fn test_role_outputs_flow_forward() {
    let executor = Arc::new(RoleMockExecutor::new());
    let engine = TraversalEngine::new(executor.clone());

    let result = engine
        .run(&research_graph(), "rust", &ExecutionContext::new())
        .await
        .unwrap();

    assert_eq!(executor.calls(), 2);
    assert!(result.node_outputs["understand"].contains("asking about: rust"));
    assert!(result.node_outputs["plan"].starts_with("Here's my plan"));
    assert!(!result.node_outputs.contains_key("review"));
    assert_eq!(result.final_output(), Some(result.node_outputs["plan"].as_str()));
}

#[tokio::test]
async fn test_single_node_graph_produces_sentinel() {
    let graph =
        Graph::new(vec![agent_node("only", "Review Agent")], vec![], "only", "only").unwrap();
    let executor = Arc::new(RoleMockExecutor::new());
    let engine = TraversalEngine::new(executor.clone());

    let result = engine
        .run(&graph, "x", &ExecutionContext::new())
        .await
        .unwrap();

    assert_eq!(executor.calls(), 0);
    assert!(result.node_outputs.is_empty());
    assert_eq!(result.messages[1].content, NO_OUTPUT);
}

#[tokio::test]
async fn test_dead_end_stops_without_error() {
    let graph = Graph::new(
        vec![agent_node("A", "Understanding Agent"), agent_node("Z", "Review Agent")],
        vec![Edge::new("Z", "A")],
        "A",
        "Z",
    )
    .unwrap();
    let engine = TraversalEngine::new(Arc::new(RoleMockExecutor::new()));

    let result = engine
        .run(&graph, "topic", &ExecutionContext::new())
        .await
        .unwrap();

    assert_eq!(result.final_node_id, "A");
    assert_ne!(result.final_node_id, graph.exit_node());
    assert!(!result.reached_exit);
}

#[tokio::test]
async fn test_unknown_entry_fails_before_output() {
    let graph =
        Graph::new(vec![agent_node("A", "Planning Agent")], vec![], "missing", "A").unwrap();
    let executor = Arc::new(RoleMockExecutor::new());
    let engine = TraversalEngine::new(executor.clone());
    let (tx, rx) = mpsc::channel(16);

    let err = engine
        .run_stream(&graph, "x", &ExecutionContext::new(), tx)
        .await
        .unwrap_err();

    assert!(matches!(err, SwarmError::UnknownNode(ref id) if id == "missing"));
    assert_eq!(executor.calls(), 0);

    let frames = collect(rx).await;
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], StreamEvent::start());
    assert!(matches!(frames[1], StreamEvent::Error { .. }));
}

#[tokio::test]
async fn test_step_failure_is_surfaced() {
    let engine = TraversalEngine::new(Arc::new(BrokenExecutor));
    let err = engine
        .run(&research_graph(), "x", &ExecutionContext::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "step_execution");
    assert!(err.to_string().contains("'understand'"));
    assert!(err.to_string().contains("rate limited by upstream"));
}

// ============================================================================
// Streaming Tests
// ============================================================================

#[tokio::test]
async fn test_stream_chunks_by_paragraph() {
    let engine = TraversalEngine::new(Arc::new(RoleMockExecutor::new()));
    let (tx, rx) = mpsc::channel(64);

    engine
        .run_stream(&research_graph(), "rust", &ExecutionContext::new(), tx)
        .await
        .unwrap();
    let frames = collect(rx).await;

    let chunks: Vec<(String, String)> = frames
        .iter()
        .filter_map(|f| match f {
            StreamEvent::Content { content, node_id } => Some((node_id.clone(), content.clone())),
            _ => None,
        })
        .collect();

    assert_eq!(
        chunks,
        vec![
            (
                "understand".to_string(),
                "I understand you're asking about: rust\n\n".to_string()
            ),
            ("understand".to_string(), "This is a request.\n\n".to_string()),
            ("plan".to_string(), "Here's my plan:\n\n".to_string()),
            ("plan".to_string(), "1. Research\n2. Synthesize\n\n".to_string()),
        ]
    );
    assert!(frames.first() == Some(&StreamEvent::start()));
    assert!(frames.last().unwrap().is_terminal());
}

#[tokio::test]
async fn test_stream_and_aggregate_agree() {
    let engine = TraversalEngine::new(Arc::new(RoleMockExecutor::new()));
    let ctx = ExecutionContext::new().with("locale", "en");

    let aggregate = engine.run(&research_graph(), "rust", &ctx).await.unwrap();
    let (tx, rx) = mpsc::channel(64);
    let streamed = engine
        .run_stream(&research_graph(), "rust", &ctx, tx)
        .await
        .unwrap();

    assert_eq!(aggregate.node_outputs, streamed.node_outputs);
    assert_eq!(aggregate.messages, streamed.messages);

    match collect(rx).await.pop() {
        Some(StreamEvent::End { response, .. }) => {
            assert_eq!(response.messages, aggregate.messages);
            assert_eq!(response.final_node_id, "review");
        }
        other => panic!("Expected end frame, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dropped_consumer_does_not_abort_traversal() {
    let engine = TraversalEngine::new(Arc::new(RoleMockExecutor::with_delay(
        Duration::from_millis(5),
    )));
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let result = engine
        .run_stream(&research_graph(), "rust", &ExecutionContext::new(), tx)
        .await
        .unwrap();
    assert_eq!(result.node_outputs.len(), 2);
}

// ============================================================================
// History Mode Tests
// ============================================================================

#[tokio::test]
async fn test_persistent_engine_serializes_concurrent_traversals() {
    let engine = Arc::new(TraversalEngine::with_history(
        Arc::new(RoleMockExecutor::with_delay(Duration::from_millis(10))),
        HistoryMode::Persistent,
    ));
    let graph = Arc::new(research_graph());

    let handles: Vec<_> = (0..3)
        .map(|i| {
            let engine = engine.clone();
            let graph = graph.clone();
            tokio::spawn(async move {
                engine
                    .run(&graph, &format!("q{}", i), &ExecutionContext::new())
                    .await
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let history = engine.history().await;
    assert_eq!(history.len(), 6);
    for pair in history.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
    }
}

// ============================================================================
// Loading and Request Tests
// ============================================================================

#[test]
fn test_load_yaml_request() {
    let yaml = r#"
workflow:
  name: research
  graph:
    entryNode: understand
    exitNode: review
    nodes:
      - id: understand
        agent:
          name: Understanding Agent
          instructions: Work out what the user wants.
      - id: review
        agent:
          name: Review Agent
    edges:
      - from: understand
        to: review
input: tell me about rust
context_variables:
  user_id: 42
"#;
    let prepared = WorkflowLoader::parse_yaml(yaml).unwrap().prepare().unwrap();
    assert_eq!(prepared.graph.len(), 2);
    assert_eq!(prepared.graph.next_node("understand"), Some("review"));
    assert_eq!(prepared.context.get("user_id"), Some(&json!(42)));
    assert!(!prepared.stream);
}

#[test]
fn test_prepare_rejects_incomplete_requests() {
    let no_input = WorkflowLoader::parse_json(
        r#"{ "workflow": { "graph": { "nodes": [ { "id": "a" } ], "entryNode": "a", "exitNode": "a" } } }"#,
    )
    .unwrap();
    assert!(matches!(
        no_input.prepare().unwrap_err(),
        SwarmError::Validation(ValidationError::MissingInput)
    ));

    let no_exit = WorkflowLoader::parse_json(
        r#"{ "workflow": { "graph": { "nodes": [ { "id": "a" } ], "entryNode": "a" } }, "input": "x" }"#,
    )
    .unwrap();
    assert!(matches!(
        no_exit.prepare().unwrap_err(),
        SwarmError::Validation(ValidationError::MissingEntryOrExit)
    ));
}

#[tokio::test]
async fn test_bridge_streams_ndjson() {
    let engine = Arc::new(TraversalEngine::new(Arc::new(EchoStepExecutor)));
    let bridge = Bridge::new(engine, ToolRegistry::new());
    let mut input: &[u8] = br#"{
        "workflow": { "graph": {
            "nodes": [ { "id": "a" }, { "id": "b" } ],
            "edges": [ { "from": "a", "to": "b" } ],
            "entryNode": "a", "exitNode": "b"
        } },
        "input": "one\n\ntwo",
        "stream": true
    }"#;

    let request = Bridge::read_request(&mut input).await.unwrap();
    let mut out = Vec::new();
    bridge.handle(request, &mut out).await.unwrap();

    let frames: Vec<StreamEvent> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(frames.len(), 5);
    assert_eq!(
        frames[2],
        StreamEvent::Content {
            content: "a:one\n\n".to_string(),
            node_id: "a".to_string()
        }
    );
    assert!(matches!(frames[4], StreamEvent::End { .. }));
}

// ============================================================================
// LLM Step Tests
// ============================================================================

#[tokio::test]
async fn test_llm_steps_with_tools() {
    let registry = ToolRegistry::new();
    register_builtins(&registry).await;
    let counter = Arc::new(CountingTool {
        calls: AtomicUsize::new(0),
    });
    registry.register(counter.clone()).await;

    let mut counting = AgentSpec::new("Counting Agent", "Count things.");
    counting.tools = vec!["counter".to_string()];
    let graph = Graph::new(
        vec![Node::new("count", counting), agent_node("done", "Review Agent")],
        vec![Edge::new("count", "done")],
        "count",
        "done",
    )
    .unwrap();
    register_declared_functions(&registry, &graph).await;

    let model = Arc::new(MockModel::new(vec![
        Content {
            role: ModelRole::Assistant,
            parts: vec![Part::FunctionCall {
                id: "call_1".to_string(),
                name: "counter".to_string(),
                args: json!({}),
            }],
        },
        Content::text(ModelRole::Assistant, "Counted once."),
    ]));
    let engine = TraversalEngine::new(Arc::new(LlmStepExecutor::new(model, registry, 5)));

    let result = engine
        .run(&graph, "go", &ExecutionContext::new())
        .await
        .unwrap();

    assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.node_outputs["count"], "Counted once.");
    assert_eq!(result.final_node_id, "done");
}
