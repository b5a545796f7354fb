//! Persistence port for `UserGoal`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::UserGoal;

#[async_trait]
pub trait GoalRepository: Send + Sync {
    async fn create(&self, goal: &UserGoal) -> CoreResult<()>;
    /// Returns `Ok(None)` both when the goal does not exist and when it
    /// belongs to a different tenant — callers must treat the two
    /// identically (404, never 403).
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<UserGoal>>;
    async fn update(&self, goal: &UserGoal) -> CoreResult<()>;
    async fn list_for_tenant(&self, tenant_id: Uuid) -> CoreResult<Vec<UserGoal>>;
    async fn list_active_for_user(&self, tenant_id: Uuid, user_id: Uuid) -> CoreResult<Vec<UserGoal>>;
}
