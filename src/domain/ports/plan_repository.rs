//! Persistence port for `PlanRecord`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::PlanRecord;

#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn create(&self, plan: &PlanRecord) -> CoreResult<()>;
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<PlanRecord>>;
    async fn update(&self, plan: &PlanRecord) -> CoreResult<()>;
    async fn list_for_goal(&self, tenant_id: Uuid, goal_id: Uuid) -> CoreResult<Vec<PlanRecord>>;
}
