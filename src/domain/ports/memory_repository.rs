//! Persistence port for `AgentMemory`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::AgentMemory;

#[async_trait]
pub trait MemoryRepository: Send + Sync {
    async fn store(&self, memory: &AgentMemory) -> CoreResult<()>;
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<AgentMemory>>;
    /// Candidate set for relevance scoring: all non-expired memories for
    /// the tenant (optionally narrowed to one agent), newest first.
    async fn list_candidates(
        &self,
        tenant_id: Uuid,
        agent_id: Option<Uuid>,
        limit: u32,
    ) -> CoreResult<Vec<AgentMemory>>;
    async fn touch_accessed(&self, tenant_id: Uuid, id: Uuid, at: DateTime<Utc>) -> CoreResult<()>;
    /// Deletes every expired row for the tenant, returning the count
    /// removed.
    async fn delete_expired(&self, tenant_id: Uuid, now: DateTime<Utc>) -> CoreResult<u64>;
}
