//! `AgentMemory` persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::AgentMemory;
use crate::domain::ports::MemoryRepository;

pub struct PgMemoryRepository {
    pool: PgPool,
}

impl PgMemoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MemoryRow {
    id: Uuid,
    tenant_id: Uuid,
    agent_id: Option<Uuid>,
    content: String,
    tags: Vec<String>,
    relevance_score: Option<f32>,
    created_at: DateTime<Utc>,
    last_accessed_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<MemoryRow> for AgentMemory {
    fn from(row: MemoryRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            agent_id: row.agent_id,
            content: row.content,
            tags: row.tags,
            relevance_score: row.relevance_score,
            created_at: row.created_at,
            last_accessed_at: row.last_accessed_at,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl MemoryRepository for PgMemoryRepository {
    async fn store(&self, memory: &AgentMemory) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO agent_memories \
             (id, tenant_id, agent_id, content, tags, relevance_score, created_at, last_accessed_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(memory.id)
        .bind(memory.tenant_id)
        .bind(memory.agent_id)
        .bind(&memory.content)
        .bind(&memory.tags)
        .bind(memory.relevance_score)
        .bind(memory.created_at)
        .bind(memory.last_accessed_at)
        .bind(memory.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<AgentMemory>> {
        let row = sqlx::query_as::<_, MemoryRow>(
            "SELECT id, tenant_id, agent_id, content, tags, relevance_score, created_at, \
             last_accessed_at, expires_at FROM agent_memories WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(AgentMemory::from))
    }

    async fn list_candidates(
        &self,
        tenant_id: Uuid,
        agent_id: Option<Uuid>,
        limit: u32,
    ) -> CoreResult<Vec<AgentMemory>> {
        let rows = sqlx::query_as::<_, MemoryRow>(
            "SELECT id, tenant_id, agent_id, content, tags, relevance_score, created_at, \
             last_accessed_at, expires_at FROM agent_memories \
             WHERE tenant_id = $1 \
               AND (expires_at IS NULL OR expires_at > now()) \
               AND ($2::uuid IS NULL OR agent_id = $2) \
             ORDER BY created_at DESC LIMIT $3",
        )
        .bind(tenant_id)
        .bind(agent_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AgentMemory::from).collect())
    }

    async fn touch_accessed(&self, tenant_id: Uuid, id: Uuid, at: DateTime<Utc>) -> CoreResult<()> {
        sqlx::query("UPDATE agent_memories SET last_accessed_at = $3 WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self, tenant_id: Uuid, now: DateTime<Utc>) -> CoreResult<u64> {
        let result = sqlx::query(
            "DELETE FROM agent_memories WHERE tenant_id = $1 AND expires_at IS NOT NULL AND expires_at <= $2",
        )
        .bind(tenant_id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
