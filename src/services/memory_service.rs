//! Agent Memory Store: store, search, and prune durable context.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::AgentMemory;
use crate::domain::ports::llm_client::{ChatMessage, CompletionRequest};
use crate::domain::ports::{LlmClient, MemoryRepository};

#[derive(Debug, Deserialize)]
struct RelevanceScores {
    scores: Vec<f32>,
}

/// Searches candidate memories for `query`, scoring relevance with the LLM
/// rather than a fixed keyword match, and returns the top `limit` sorted
/// descending. Falls back to recency order if scoring fails to parse.
pub async fn search(
    memories: &Arc<dyn MemoryRepository>,
    llm: &Arc<dyn LlmClient>,
    tenant_id: Uuid,
    agent_id: Option<Uuid>,
    query: &str,
    limit: u32,
) -> CoreResult<Vec<AgentMemory>> {
    let candidates = memories.list_candidates(tenant_id, agent_id, limit.max(20)).await?;
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let listing = candidates
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{i}: {}", m.content))
        .collect::<Vec<_>>()
        .join("\n");

    let response = llm
        .complete(CompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "Score each memory's relevance to the query from 0 to 1. \
                              Respond as JSON only: {\"scores\": [float, ...]} in the same \
                              order as the memories given."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("Query: {query}\n\nMemories:\n{listing}"),
                },
            ],
            model: None,
            temperature: 0.0,
            max_tokens: 512,
        })
        .await;

    let mut scored: Vec<(AgentMemory, f32)> = match response
        .ok()
        .and_then(|r| serde_json::from_str::<RelevanceScores>(&r.content).ok())
        .filter(|s| s.scores.len() == candidates.len())
    {
        Some(scores) => candidates.into_iter().zip(scores.scores).collect(),
        None => candidates
            .into_iter()
            .enumerate()
            .map(|(i, m)| (m, 1.0 / (i as f32 + 1.0)))
            .collect(),
    };

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let now = Utc::now();
    let mut results = Vec::with_capacity(limit as usize);
    for (mut memory, score) in scored.into_iter().take(limit as usize) {
        memory.relevance_score = Some(score);
        memories.touch_accessed(tenant_id, memory.id, now).await?;
        results.push(memory);
    }
    Ok(results)
}

/// Deletes every memory past its `expires_at`, returning how many rows
/// were removed.
pub async fn cleanup_expired(memories: &Arc<dyn MemoryRepository>, tenant_id: Uuid) -> CoreResult<u64> {
    memories.delete_expired(tenant_id, Utc::now()).await
}

/// Builds the memory context an agent should see before starting a task:
/// the most relevant entries for its own id, joined into a single block.
pub async fn context_for_agent(
    memories: &Arc<dyn MemoryRepository>,
    llm: &Arc<dyn LlmClient>,
    tenant_id: Uuid,
    agent_id: Uuid,
    task_description: &str,
) -> CoreResult<String> {
    let relevant = search(memories, llm, tenant_id, Some(agent_id), task_description, 5).await?;
    Ok(relevant
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n---\n"))
}
