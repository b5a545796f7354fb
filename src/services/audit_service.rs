//! Audit Log: append-only record of who did what, and whether it was
//! allowed.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::audit::AuditOutcome;
use crate::domain::models::AuditLog;
use crate::domain::ports::AuditRepository;

#[allow(clippy::too_many_arguments)]
pub async fn record(
    audit: &Arc<dyn AuditRepository>,
    tenant_id: Uuid,
    actor_user_id: Option<Uuid>,
    action: &str,
    resource_type: &'static str,
    resource_id: Option<Uuid>,
    outcome: AuditOutcome,
    detail: Value,
) -> CoreResult<()> {
    let entry = AuditLog {
        id: Uuid::new_v4(),
        tenant_id,
        actor_user_id,
        action: action.to_string(),
        resource_type: resource_type.to_string(),
        resource_id,
        outcome,
        detail,
        occurred_at: Utc::now(),
    };
    audit.record(&entry).await
}

pub async fn list_for_tenant(audit: &Arc<dyn AuditRepository>, tenant_id: Uuid, limit: u32) -> CoreResult<Vec<AuditLog>> {
    audit.list_for_tenant(tenant_id, limit).await
}
