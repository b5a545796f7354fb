//! `AgentSpec` registry, backed by Postgres.
//!
//! Grounded on the teacher's `adapters::substrates::registry` lookup
//! pattern, with persistence added since agents here are tenant-owned
//! configuration rather than process-local substrate handles.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::AgentSpec;
use crate::domain::ports::AgentRegistry;

pub struct PgAgentRegistry {
    pool: PgPool,
}

impl PgAgentRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AgentRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    description: String,
    system_prompt: String,
    allowed_tools: Vec<String>,
    is_enabled: bool,
}

impl From<AgentRow> for AgentSpec {
    fn from(row: AgentRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            description: row.description,
            system_prompt: row.system_prompt,
            allowed_tools: row.allowed_tools,
            is_enabled: row.is_enabled,
        }
    }
}

const AGENT_COLUMNS: &str = "id, tenant_id, name, description, system_prompt, allowed_tools, is_enabled";

#[async_trait]
impl AgentRegistry for PgAgentRegistry {
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<AgentSpec>> {
        let row = sqlx::query_as::<_, AgentRow>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agent_specs WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(AgentSpec::from))
    }

    async fn list_enabled(&self, tenant_id: Uuid) -> CoreResult<Vec<AgentSpec>> {
        let rows = sqlx::query_as::<_, AgentRow>(&format!(
            "SELECT {AGENT_COLUMNS} FROM agent_specs WHERE tenant_id = $1 AND is_enabled = true ORDER BY name"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AgentSpec::from).collect())
    }

    async fn register(&self, agent: &AgentSpec) -> CoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO agent_specs ({AGENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
               name = EXCLUDED.name, description = EXCLUDED.description, \
               system_prompt = EXCLUDED.system_prompt, allowed_tools = EXCLUDED.allowed_tools, \
               is_enabled = EXCLUDED.is_enabled"
        ))
        .bind(agent.id)
        .bind(agent.tenant_id)
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(&agent.system_prompt)
        .bind(&agent.allowed_tools)
        .bind(agent.is_enabled)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
