//! Persistence port for `AuditLog`. Append-only: there is no `update` or
//! `delete`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::AuditLog;

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn record(&self, entry: &AuditLog) -> CoreResult<()>;
    async fn list_for_tenant(&self, tenant_id: Uuid, limit: u32) -> CoreResult<Vec<AuditLog>>;
}
