//! Registry of available agents for a tenant.
//!
//! Grounded on the teacher's substrate registry pattern
//! (`adapters::substrates::registry`): a lookup keyed by identity rather
//! than a dispatch `match`, so new agents are added by registration, not
//! by editing a central switch.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::AgentSpec;

#[async_trait]
pub trait AgentRegistry: Send + Sync {
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<AgentSpec>>;
    async fn list_enabled(&self, tenant_id: Uuid) -> CoreResult<Vec<AgentSpec>>;
    async fn register(&self, agent: &AgentSpec) -> CoreResult<()>;
}
