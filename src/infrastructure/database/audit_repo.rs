//! `AuditLog` persistence. Append-only: no update/delete methods exist on
//! the trait, and none are implemented here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::audit::AuditOutcome;
use crate::domain::models::AuditLog;
use crate::domain::ports::AuditRepository;

pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    tenant_id: Uuid,
    actor_user_id: Option<Uuid>,
    action: String,
    resource_type: String,
    resource_id: Option<Uuid>,
    outcome: String,
    detail: Json<serde_json::Value>,
    occurred_at: DateTime<Utc>,
}

fn outcome_to_str(outcome: AuditOutcome) -> &'static str {
    match outcome {
        AuditOutcome::Success => "success",
        AuditOutcome::Denied => "denied",
        AuditOutcome::Error => "error",
    }
}

fn outcome_from_str(s: &str) -> AuditOutcome {
    match s {
        "denied" => AuditOutcome::Denied,
        "error" => AuditOutcome::Error,
        _ => AuditOutcome::Success,
    }
}

impl From<AuditRow> for AuditLog {
    fn from(row: AuditRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            actor_user_id: row.actor_user_id,
            action: row.action,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            outcome: outcome_from_str(&row.outcome),
            detail: row.detail.0,
            occurred_at: row.occurred_at,
        }
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn record(&self, entry: &AuditLog) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO audit_logs \
             (id, tenant_id, actor_user_id, action, resource_type, resource_id, outcome, detail, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(entry.id)
        .bind(entry.tenant_id)
        .bind(entry.actor_user_id)
        .bind(&entry.action)
        .bind(&entry.resource_type)
        .bind(entry.resource_id)
        .bind(outcome_to_str(entry.outcome))
        .bind(Json(&entry.detail))
        .bind(entry.occurred_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_tenant(&self, tenant_id: Uuid, limit: u32) -> CoreResult<Vec<AuditLog>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT id, tenant_id, actor_user_id, action, resource_type, resource_id, outcome, detail, occurred_at \
             FROM audit_logs WHERE tenant_id = $1 ORDER BY occurred_at DESC LIMIT $2",
        )
        .bind(tenant_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AuditLog::from).collect())
    }
}
