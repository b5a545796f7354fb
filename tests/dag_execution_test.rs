//! Covers the three-task sequential DAG, cycle-detection, dependency-context
//! propagation, and failed-dependent-skipping scenarios.

use std::sync::Arc;

use async_trait::async_trait;
use eap_core::domain::errors::{CoreError, CoreResult};
use eap_core::domain::models::task::{DagError, TaskNode, TaskStatus};
use eap_core::domain::models::{AgentSpec, TaskGraph};
use eap_core::domain::ports::llm_client::{CompletionRequest, CompletionResponse};
use eap_core::domain::ports::{AgentRegistry, LlmClient};
use eap_core::services::dag_executor::{DagExecutor, ExecutorConfig};
use uuid::Uuid;

struct EchoLlmClient;

#[async_trait]
impl LlmClient for EchoLlmClient {
    async fn complete(&self, _request: CompletionRequest) -> CoreResult<CompletionResponse> {
        Ok(CompletionResponse {
            content: "done".to_string(),
            model: "test-model".to_string(),
            prompt_tokens: 10,
            completion_tokens: 5,
        })
    }

    async fn embed(&self, _texts: Vec<String>, _model: Option<String>) -> CoreResult<Vec<Vec<f32>>> {
        Ok(Vec::new())
    }
}

struct EmptyAgentRegistry;

#[async_trait]
impl AgentRegistry for EmptyAgentRegistry {
    async fn get(&self, _tenant_id: Uuid, _id: Uuid) -> CoreResult<Option<AgentSpec>> {
        Ok(None)
    }

    async fn list_enabled(&self, _tenant_id: Uuid) -> CoreResult<Vec<AgentSpec>> {
        Ok(Vec::new())
    }

    async fn register(&self, _agent: &AgentSpec) -> CoreResult<()> {
        Ok(())
    }
}

fn node(description: &str, deps: &[Uuid]) -> TaskNode {
    let mut n = TaskNode::new(description, None);
    n.dependencies = deps.to_vec();
    n
}

#[tokio::test]
async fn three_task_chain_executes_wave_by_wave_to_completion() {
    let security = node("security review", &[]);
    let implementation = node("implementation", &[security.id]);
    let test = node("test", &[implementation.id]);

    let mut graph = TaskGraph::new(
        "Deploy service X",
        vec![security.clone(), implementation.clone(), test.clone()],
    )
    .unwrap();

    let waves = graph.execution_waves().unwrap();
    assert_eq!(waves, vec![vec![security.id], vec![implementation.id], vec![test.id]]);

    let ordered = graph.topological_sort().unwrap();
    assert_eq!(ordered.len(), 3);

    let executor = DagExecutor::new(
        Arc::new(EmptyAgentRegistry),
        Arc::new(EchoLlmClient),
        ExecutorConfig::default(),
    );

    let results = executor.execute(&mut graph, Uuid::new_v4(), None).await.unwrap();
    assert_eq!(results.completed, 3);
    assert_eq!(results.failed, 0);

    for id in [security.id, implementation.id, test.id] {
        assert_eq!(graph.nodes[&id].status, TaskStatus::Complete);
    }
}

#[test]
fn a_two_cycle_is_refused_at_construction() {
    let mut a = node("a", &[]);
    let mut b = node("b", &[]);
    a.dependencies.push(b.id);
    b.dependencies.push(a.id);

    let err = TaskGraph::new("Deploy service X", vec![a, b]).unwrap_err();
    assert_eq!(err, DagError::CycleDetected);
}

/// Echoes the exact user-message content back as its response, so a test
/// can inspect what context a downstream task actually received.
struct CapturingLlmClient {
    seen: tokio::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl LlmClient for CapturingLlmClient {
    async fn complete(&self, request: CompletionRequest) -> CoreResult<CompletionResponse> {
        let user_message = request
            .messages
            .iter()
            .find(|m| m.role == "user")
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.seen.lock().await.push(user_message.clone());
        Ok(CompletionResponse {
            content: format!("result of: {user_message}"),
            model: "test-model".to_string(),
            prompt_tokens: 10,
            completion_tokens: 5,
        })
    }

    async fn embed(&self, _texts: Vec<String>, _model: Option<String>) -> CoreResult<Vec<Vec<f32>>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn a_dependent_task_receives_its_dependency_result_as_context() {
    let security = node("security review", &[]);
    let implementation = node("implementation", &[security.id]);

    let mut graph = TaskGraph::new("Deploy service X", vec![security.clone(), implementation.clone()]).unwrap();

    let llm = Arc::new(CapturingLlmClient {
        seen: tokio::sync::Mutex::new(Vec::new()),
    });
    let executor = DagExecutor::new(Arc::new(EmptyAgentRegistry), llm.clone(), ExecutorConfig::default());

    let results = executor.execute(&mut graph, Uuid::new_v4(), None).await.unwrap();
    assert_eq!(results.completed, 2);

    let seen = llm.seen.lock().await;
    assert_eq!(seen[0], "security review");
    assert!(seen[1].starts_with("Context from dependencies:\n"));
    assert!(seen[1].contains("security review: result of: security review"));
    assert!(seen[1].ends_with("implementation"));
}

struct FailsOnDescription {
    failing_description: &'static str,
}

#[async_trait]
impl LlmClient for FailsOnDescription {
    async fn complete(&self, request: CompletionRequest) -> CoreResult<CompletionResponse> {
        let content = request.messages.last().map(|m| m.content.as_str()).unwrap_or_default();
        if content == self.failing_description {
            return Err(CoreError::LlmUnavailable("simulated failure".to_string()));
        }
        Ok(CompletionResponse {
            content: "done".to_string(),
            model: "test-model".to_string(),
            prompt_tokens: 10,
            completion_tokens: 5,
        })
    }

    async fn embed(&self, _texts: Vec<String>, _model: Option<String>) -> CoreResult<Vec<Vec<f32>>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn a_failed_task_causes_its_dependent_to_be_skipped_not_run() {
    let security = node("security review", &[]);
    let implementation = node("implementation", &[security.id]);
    let test = node("test", &[implementation.id]);

    let mut graph = TaskGraph::new(
        "Deploy service X",
        vec![security.clone(), implementation.clone(), test.clone()],
    )
    .unwrap();

    let executor = DagExecutor::new(
        Arc::new(EmptyAgentRegistry),
        Arc::new(FailsOnDescription {
            failing_description: "security review",
        }),
        ExecutorConfig {
            max_retries: 0,
            ..ExecutorConfig::default()
        },
    );

    let results = executor.execute(&mut graph, Uuid::new_v4(), None).await.unwrap();

    assert_eq!(graph.nodes[&security.id].status, TaskStatus::Failed);
    assert_eq!(graph.nodes[&implementation.id].status, TaskStatus::Blocked);
    assert_eq!(graph.nodes[&test.id].status, TaskStatus::Blocked);
    assert!(graph.nodes[&implementation.id].result.is_none());
    assert_eq!(results.completed, 0);
    assert_eq!(results.failed, 3);
}
