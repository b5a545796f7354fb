//! Goal Planner: turns a natural-language goal into a validated task graph.
//!
//! Grounded on `original_source/agent/composition/goal_planner.py`: the
//! LLM is asked to decompose a goal into a JSON node list, the caller's
//! other active goals are folded into the prompt as context, and the
//! resulting graph is validated the same way `domain::models::task`
//! validates any other graph — reusing the teacher's DAG algorithms
//! rather than re-deriving them.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::models::{AgentSpec, TaskGraph, TaskNode};
use crate::domain::ports::llm_client::{ChatMessage, CompletionRequest};
use crate::domain::ports::{GoalRepository, LlmClient};

const SYSTEM_PROMPT: &str = "You decompose a goal into a dependency-ordered list of tasks. \
Respond with JSON only: {\"tasks\": [{\"description\": str, \"agent_name\": str, \
\"depends_on\": [int indices into this array]}]}.";

#[derive(Debug, Deserialize)]
struct PlannedTask {
    description: String,
    agent_name: Option<String>,
    #[serde(default)]
    depends_on: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct PlannerResponse {
    tasks: Vec<PlannedTask>,
}

/// Decomposes `goal_description` into a `TaskGraph`.
///
/// When `requesting_user_id` is set and differs from `user_id`, the caller
/// is planning on another user's behalf; `user_id`'s other active goals are
/// left out of the prompt so that activity isn't disclosed across users.
#[allow(clippy::too_many_arguments)]
pub async fn decompose(
    llm: &Arc<dyn LlmClient>,
    goals: &Arc<dyn GoalRepository>,
    tenant_id: Uuid,
    user_id: Uuid,
    requesting_user_id: Option<Uuid>,
    goal_description: &str,
    available_agents: &[AgentSpec],
) -> CoreResult<TaskGraph> {
    // When planning on another user's behalf, their in-flight goals are not
    // loaded into the prompt at all — folding them in would leak one
    // user's activity to another regardless of role.
    let active_goals = match requesting_user_id {
        Some(requester) if requester != user_id => Vec::new(),
        _ => goals.list_active_for_user(tenant_id, user_id).await?,
    };
    let mut prompt = format!("Goal: {goal_description}\n");
    if !active_goals.is_empty() {
        prompt.push_str("The user has other active goals in flight:\n");
        for g in &active_goals {
            prompt.push_str(&format!("- {}\n", g.description));
        }
    }
    if !available_agents.is_empty() {
        prompt.push_str("Available agents:\n");
        for a in available_agents {
            prompt.push_str(&format!("- {}: {}\n", a.name, a.description));
        }
    }

    let response = llm
        .complete(CompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            model: None,
            temperature: 0.5,
            max_tokens: 2048,
        })
        .await?;

    build_graph_from_response(&response.content, goal_description, available_agents)
}

fn build_graph_from_response(
    raw: &str,
    goal_description: &str,
    available_agents: &[AgentSpec],
) -> CoreResult<TaskGraph> {
    let parsed: PlannerResponse = match serde_json::from_str(raw) {
        Ok(p) => p,
        Err(_) => return fallback_graph(goal_description, available_agents, "malformed_json"),
    };

    if parsed.tasks.is_empty() {
        return fallback_graph(goal_description, available_agents, "empty_task_list");
    }

    let mut nodes: Vec<TaskNode> = Vec::with_capacity(parsed.tasks.len());
    for task in &parsed.tasks {
        let agent_id = task
            .agent_name
            .as_deref()
            .and_then(|name| available_agents.iter().find(|a| a.name == name))
            .map(|a| a.id);
        nodes.push(TaskNode::new(task.description.clone(), agent_id));
    }
    for (i, task) in parsed.tasks.iter().enumerate() {
        for dep_index in &task.depends_on {
            if let Some(dep_node) = nodes.get(*dep_index) {
                let dep_id = dep_node.id;
                nodes[i].dependencies.push(dep_id);
            }
        }
    }

    TaskGraph::new(goal_description, nodes).map_err(CoreError::from)
}

/// Conservative fallback: a single task capturing the whole goal, assigned
/// to the first available agent, so an unusable planner response still
/// yields something a human can act on instead of an error. The reason is
/// recorded on the graph so downstream consumers can tell a plan apart from
/// a degraded one.
fn fallback_graph(goal_description: &str, available_agents: &[AgentSpec], reason: &str) -> CoreResult<TaskGraph> {
    let agent_id = available_agents.first().map(|a| a.id);
    let node = TaskNode::new(goal_description, agent_id);
    let mut graph = TaskGraph::new(goal_description, vec![node]).map_err(CoreError::from)?;
    graph
        .metadata
        .insert("planner_fallback".to_string(), serde_json::json!({"reason": reason}));
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_json_falls_back_to_a_single_task() {
        let graph = build_graph_from_response("not json", "ship the feature", &[]).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(
            graph.metadata.get("planner_fallback"),
            Some(&serde_json::json!({"reason": "malformed_json"}))
        );
    }

    #[test]
    fn fallback_task_is_assigned_to_the_first_available_agent() {
        let agent = AgentSpec {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "generalist".to_string(),
            description: "handles anything".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            allowed_tools: Vec::new(),
            is_enabled: true,
        };
        let graph = build_graph_from_response("not json", "ship the feature", &[agent.clone()]).unwrap();
        let node = graph.nodes.values().next().unwrap();
        assert_eq!(node.agent_id, Some(agent.id));
    }

    #[test]
    fn empty_task_list_falls_back_with_its_own_reason() {
        let graph = build_graph_from_response(r#"{"tasks":[]}"#, "ship the feature", &[]).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(
            graph.metadata.get("planner_fallback"),
            Some(&serde_json::json!({"reason": "empty_task_list"}))
        );
    }

    #[test]
    fn well_formed_plan_preserves_dependency_order() {
        let raw = r#"{"tasks":[{"description":"write tests","agent_name":null,"depends_on":[]},
                                {"description":"implement","agent_name":null,"depends_on":[0]}]}"#;
        let graph = build_graph_from_response(raw, "ship the feature", &[]).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        let waves = graph.execution_waves().unwrap();
        assert_eq!(waves.len(), 2);
    }
}
