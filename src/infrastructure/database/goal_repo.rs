//! `UserGoal` persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::goal::GoalStatus;
use crate::domain::models::UserGoal;
use crate::domain::ports::GoalRepository;

pub struct PgGoalRepository {
    pool: PgPool,
}

impl PgGoalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct GoalRow {
    id: Uuid,
    tenant_id: Uuid,
    user_id: Uuid,
    description: String,
    status: String,
    active_plan_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn status_to_str(status: GoalStatus) -> &'static str {
    match status {
        GoalStatus::Submitted => "submitted",
        GoalStatus::Planning => "planning",
        GoalStatus::AwaitingApproval => "awaiting_approval",
        GoalStatus::InProgress => "in_progress",
        GoalStatus::Completed => "completed",
        GoalStatus::Failed => "failed",
        GoalStatus::Canceled => "canceled",
    }
}

fn status_from_str(s: &str) -> GoalStatus {
    match s {
        "planning" => GoalStatus::Planning,
        "awaiting_approval" => GoalStatus::AwaitingApproval,
        "in_progress" => GoalStatus::InProgress,
        "completed" => GoalStatus::Completed,
        "failed" => GoalStatus::Failed,
        "canceled" => GoalStatus::Canceled,
        _ => GoalStatus::Submitted,
    }
}

impl From<GoalRow> for UserGoal {
    fn from(row: GoalRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            user_id: row.user_id,
            description: row.description,
            status: status_from_str(&row.status),
            active_plan_id: row.active_plan_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl GoalRepository for PgGoalRepository {
    async fn create(&self, goal: &UserGoal) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO user_goals \
             (id, tenant_id, user_id, description, status, active_plan_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(goal.id)
        .bind(goal.tenant_id)
        .bind(goal.user_id)
        .bind(&goal.description)
        .bind(status_to_str(goal.status))
        .bind(goal.active_plan_id)
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<UserGoal>> {
        let row = sqlx::query_as::<_, GoalRow>(
            "SELECT id, tenant_id, user_id, description, status, active_plan_id, created_at, updated_at \
             FROM user_goals WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserGoal::from))
    }

    async fn update(&self, goal: &UserGoal) -> CoreResult<()> {
        sqlx::query(
            "UPDATE user_goals SET description = $3, status = $4, active_plan_id = $5, updated_at = $6 \
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(goal.tenant_id)
        .bind(goal.id)
        .bind(&goal.description)
        .bind(status_to_str(goal.status))
        .bind(goal.active_plan_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> CoreResult<Vec<UserGoal>> {
        let rows = sqlx::query_as::<_, GoalRow>(
            "SELECT id, tenant_id, user_id, description, status, active_plan_id, created_at, updated_at \
             FROM user_goals WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(UserGoal::from).collect())
    }

    async fn list_active_for_user(&self, tenant_id: Uuid, user_id: Uuid) -> CoreResult<Vec<UserGoal>> {
        let rows = sqlx::query_as::<_, GoalRow>(
            "SELECT id, tenant_id, user_id, description, status, active_plan_id, created_at, updated_at \
             FROM user_goals \
             WHERE tenant_id = $1 AND user_id = $2 \
               AND status NOT IN ('completed', 'failed', 'canceled') \
             ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(UserGoal::from).collect())
    }
}
