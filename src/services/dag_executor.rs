//! DAG Executor: drives a `TaskGraph` to completion wave by wave.
//!
//! Grounded on the teacher's `services::dag_executor::DagExecutor` —
//! same wave-by-wave `Semaphore`-bounded concurrency shape — generalized
//! from the teacher's Claude-substrate dispatch to a generic
//! `AgentRegistry` lookup plus `LlmClient` completion per task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

use crate::domain::errors::CoreError;
use crate::domain::models::task::{AgentResponse, TaskStatus};
use crate::domain::models::TaskGraph;
use crate::domain::ports::llm_client::{ChatMessage, CompletionRequest};
use crate::domain::ports::{AgentRegistry, LlmClient};

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub max_concurrency: usize,
    pub task_timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            task_timeout_secs: 600,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Completed,
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    WaveStarted { wave_index: usize, task_count: usize },
    TaskStarted { task_id: Uuid },
    TaskCompleted { task_id: Uuid },
    TaskFailed { task_id: Uuid, error: String },
    TaskRetrying { task_id: Uuid, attempt: u32 },
    WaveCompleted { wave_index: usize },
    Completed { status: ExecutionStatus },
}

#[derive(Debug, Default)]
pub struct ExecutionResults {
    pub completed: usize,
    pub failed: usize,
    pub total_tokens: u64,
}

impl ExecutionResults {
    pub fn status(&self) -> ExecutionStatus {
        if self.failed == 0 {
            ExecutionStatus::Completed
        } else if self.completed > 0 {
            ExecutionStatus::PartialSuccess
        } else {
            ExecutionStatus::Failed
        }
    }
}

pub struct DagExecutor {
    agents: Arc<dyn AgentRegistry>,
    llm: Arc<dyn LlmClient>,
    config: ExecutorConfig,
}

impl DagExecutor {
    pub fn new(agents: Arc<dyn AgentRegistry>, llm: Arc<dyn LlmClient>, config: ExecutorConfig) -> Self {
        Self { agents, llm, config }
    }

    /// Executes every wave of `graph` in order, up to `max_concurrency`
    /// tasks within a wave at once. A task that exhausts its retries is
    /// recorded as failed and does not block sibling tasks in the same
    /// wave, but any dependent whose dependency did not complete is
    /// skipped rather than run context-less — waves are precomputed from
    /// the graph's static structure, so membership in a later wave alone
    /// doesn't mean a task's dependencies actually succeeded.
    pub async fn execute(
        &self,
        graph: &mut TaskGraph,
        tenant_id: Uuid,
        events: Option<mpsc::Sender<ExecutionEvent>>,
    ) -> Result<ExecutionResults, CoreError> {
        let waves = graph.execution_waves()?;
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut results = ExecutionResults::default();

        for (wave_index, wave) in waves.iter().enumerate() {
            if let Some(tx) = &events {
                let _ = tx
                    .send(ExecutionEvent::WaveStarted {
                        wave_index,
                        task_count: wave.len(),
                    })
                    .await;
            }

            let mut handles = Vec::with_capacity(wave.len());
            let mut skipped = Vec::new();
            for task_id in wave {
                let task_id = *task_id;
                let Some(node) = graph.nodes.get(&task_id) else { continue };
                let dependencies_met = node
                    .dependencies
                    .iter()
                    .all(|d| graph.nodes.get(d).is_some_and(|dn| dn.status == TaskStatus::Complete));
                if !dependencies_met {
                    skipped.push(task_id);
                    continue;
                }

                let description = node.description.clone();
                let agent_id = node.agent_id;
                let dependency_context: Vec<(String, String)> = node
                    .dependencies
                    .iter()
                    .filter_map(|d| {
                        graph
                            .nodes
                            .get(d)
                            .and_then(|dn| dn.result.as_ref().map(|r| (dn.description.clone(), r.content.clone())))
                    })
                    .collect();

                let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
                let agents = self.agents.clone();
                let llm = self.llm.clone();
                let config = self.config.clone();
                let events_tx = events.clone();

                let handle = tokio::spawn(async move {
                    let _permit = permit;
                    if let Some(tx) = &events_tx {
                        let _ = tx.send(ExecutionEvent::TaskStarted { task_id }).await;
                    }
                    let outcome = execute_single_task(
                        &agents,
                        &llm,
                        &config,
                        tenant_id,
                        task_id,
                        agent_id,
                        &description,
                        &dependency_context,
                        events_tx.as_ref(),
                    )
                    .await;
                    (task_id, outcome)
                });
                handles.push(handle);
            }

            for task_id in skipped {
                if let Some(node) = graph.nodes.get_mut(&task_id) {
                    node.status = TaskStatus::Blocked;
                }
                results.failed += 1;
                if let Some(tx) = &events {
                    let _ = tx
                        .send(ExecutionEvent::TaskFailed {
                            task_id,
                            error: "skipped: an upstream dependency did not complete".to_string(),
                        })
                        .await;
                }
            }

            for handle in handles {
                let (task_id, outcome) = handle.await.map_err(|e| CoreError::Internal(e.to_string()))?;
                match outcome {
                    Ok(response) => {
                        results.completed += 1;
                        results.total_tokens += u64::from(response.tokens_used);
                        if let Some(node) = graph.nodes.get_mut(&task_id) {
                            node.status = TaskStatus::Complete;
                            node.result = Some(response);
                        }
                        if let Some(tx) = &events {
                            let _ = tx.send(ExecutionEvent::TaskCompleted { task_id }).await;
                        }
                    }
                    Err(err) => {
                        results.failed += 1;
                        if let Some(node) = graph.nodes.get_mut(&task_id) {
                            node.status = TaskStatus::Failed;
                        }
                        if let Some(tx) = &events {
                            let _ = tx
                                .send(ExecutionEvent::TaskFailed {
                                    task_id,
                                    error: err.to_string(),
                                })
                                .await;
                        }
                    }
                }
            }

            if let Some(tx) = &events {
                let _ = tx.send(ExecutionEvent::WaveCompleted { wave_index }).await;
            }
        }

        if let Some(tx) = &events {
            let _ = tx
                .send(ExecutionEvent::Completed {
                    status: results.status(),
                })
                .await;
        }
        Ok(results)
    }
}

/// Renders a task's prompt: the dependency results it can see, followed by
/// its own description.
fn build_task_prompt(description: &str, dependency_context: &[(String, String)]) -> String {
    if dependency_context.is_empty() {
        return description.to_string();
    }
    let mut prompt = String::from("Context from dependencies:\n");
    for (dep_description, dep_content) in dependency_context {
        prompt.push_str(&format!("- {dep_description}: {dep_content}\n"));
    }
    prompt.push('\n');
    prompt.push_str(description);
    prompt
}

#[allow(clippy::too_many_arguments)]
async fn execute_single_task(
    agents: &Arc<dyn AgentRegistry>,
    llm: &Arc<dyn LlmClient>,
    config: &ExecutorConfig,
    tenant_id: Uuid,
    task_id: Uuid,
    agent_id: Option<Uuid>,
    description: &str,
    dependency_context: &[(String, String)],
    events: Option<&mpsc::Sender<ExecutionEvent>>,
) -> Result<AgentResponse, CoreError> {
    let system_prompt = match agent_id {
        Some(id) => agents
            .get(tenant_id, id)
            .await?
            .map(|spec| spec.system_prompt)
            .unwrap_or_else(|| "You are a helpful assistant.".to_string()),
        None => "You are a helpful assistant.".to_string(),
    };
    let user_content = build_task_prompt(description, dependency_context);

    let mut last_err: Option<CoreError> = None;
    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            if let Some(tx) = events {
                let _ = tx.send(ExecutionEvent::TaskRetrying { task_id, attempt }).await;
            }
        }
        let request = CompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_content.clone(),
                },
            ],
            model: None,
            temperature: 0.7,
            max_tokens: 2048,
        };

        let call = llm.complete(request);
        match tokio::time::timeout(Duration::from_secs(config.task_timeout_secs), call).await {
            Ok(Ok(response)) => {
                return Ok(AgentResponse {
                    content: response.content,
                    model: response.model,
                    tokens_used: response.total_tokens(),
                });
            }
            Ok(Err(err)) => last_err = Some(err),
            Err(_) => last_err = Some(CoreError::LlmUnavailable("task timed out".to_string())),
        }
    }
    Err(last_err.unwrap_or_else(|| CoreError::Internal("task failed with no recorded error".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_without_dependencies_is_just_the_description() {
        assert_eq!(build_task_prompt("write the tests", &[]), "write the tests");
    }

    #[test]
    fn prompt_with_dependencies_includes_their_results() {
        let context = vec![("security review".to_string(), "no issues found".to_string())];
        let prompt = build_task_prompt("implement the feature", &context);
        assert!(prompt.starts_with("Context from dependencies:\n"));
        assert!(prompt.contains("security review: no issues found"));
        assert!(prompt.ends_with("implement the feature"));
    }

    #[test]
    fn status_is_completed_only_with_zero_failures() {
        let results = ExecutionResults {
            completed: 3,
            failed: 0,
            total_tokens: 100,
        };
        assert_eq!(results.status(), ExecutionStatus::Completed);
    }

    #[test]
    fn status_is_partial_success_with_some_failures() {
        let results = ExecutionResults {
            completed: 2,
            failed: 1,
            total_tokens: 100,
        };
        assert_eq!(results.status(), ExecutionStatus::PartialSuccess);
    }

    #[test]
    fn status_is_failed_when_nothing_completed() {
        let results = ExecutionResults {
            completed: 0,
            failed: 2,
            total_tokens: 0,
        };
        assert_eq!(results.status(), ExecutionStatus::Failed);
    }
}
