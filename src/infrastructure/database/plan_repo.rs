//! `PlanRecord` persistence. The task graph is stored as a JSONB column —
//! it is read/written as a whole rather than normalized across tables,
//! matching the teacher's practice of JSON-encoding nested structures
//! (`adapters::sqlite::task_repository`'s context column).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::plan::PlanStatus;
use crate::domain::models::{PlanRecord, TaskGraph};
use crate::domain::ports::PlanRepository;

pub struct PgPlanRepository {
    pool: PgPool,
}

impl PgPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    tenant_id: Uuid,
    goal_id: Uuid,
    graph: Json<TaskGraph>,
    status: String,
    created_by: Uuid,
    approved_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
}

fn status_to_str(status: PlanStatus) -> &'static str {
    match status {
        PlanStatus::PendingApproval => "pending_approval",
        PlanStatus::Approved => "approved",
        PlanStatus::Rejected => "rejected",
        PlanStatus::Executing => "executing",
        PlanStatus::Completed => "completed",
        PlanStatus::Failed => "failed",
    }
}

fn status_from_str(s: &str) -> PlanStatus {
    match s {
        "approved" => PlanStatus::Approved,
        "rejected" => PlanStatus::Rejected,
        "executing" => PlanStatus::Executing,
        "completed" => PlanStatus::Completed,
        "failed" => PlanStatus::Failed,
        _ => PlanStatus::PendingApproval,
    }
}

impl From<PlanRow> for PlanRecord {
    fn from(row: PlanRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            goal_id: row.goal_id,
            graph: row.graph.0,
            status: status_from_str(&row.status),
            created_by: row.created_by,
            approved_by: row.approved_by,
            created_at: row.created_at,
            decided_at: row.decided_at,
        }
    }
}

#[async_trait]
impl PlanRepository for PgPlanRepository {
    async fn create(&self, plan: &PlanRecord) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO plan_records \
             (id, tenant_id, goal_id, graph, status, created_by, approved_by, created_at, decided_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(plan.id)
        .bind(plan.tenant_id)
        .bind(plan.goal_id)
        .bind(Json(&plan.graph))
        .bind(status_to_str(plan.status))
        .bind(plan.created_by)
        .bind(plan.approved_by)
        .bind(plan.created_at)
        .bind(plan.decided_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<PlanRecord>> {
        let row = sqlx::query_as::<_, PlanRow>(
            "SELECT id, tenant_id, goal_id, graph, status, created_by, approved_by, created_at, decided_at \
             FROM plan_records WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(PlanRecord::from))
    }

    async fn update(&self, plan: &PlanRecord) -> CoreResult<()> {
        sqlx::query(
            "UPDATE plan_records SET graph = $3, status = $4, approved_by = $5, decided_at = $6 \
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(plan.tenant_id)
        .bind(plan.id)
        .bind(Json(&plan.graph))
        .bind(status_to_str(plan.status))
        .bind(plan.approved_by)
        .bind(plan.decided_at.unwrap_or_else(Utc::now))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_goal(&self, tenant_id: Uuid, goal_id: Uuid) -> CoreResult<Vec<PlanRecord>> {
        let rows = sqlx::query_as::<_, PlanRow>(
            "SELECT id, tenant_id, goal_id, graph, status, created_by, approved_by, created_at, decided_at \
             FROM plan_records WHERE tenant_id = $1 AND goal_id = $2 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .bind(goal_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PlanRecord::from).collect())
    }
}
