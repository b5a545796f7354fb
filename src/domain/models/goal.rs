//! User goal: the natural-language request that the planner decomposes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Submitted,
    Planning,
    AwaitingApproval,
    InProgress,
    Completed,
    Failed,
    Canceled,
}

/// A goal a user submitted, scoped to their tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGoal {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub status: GoalStatus,
    pub active_plan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
