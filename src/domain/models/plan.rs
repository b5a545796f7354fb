//! Plan record: a decomposed goal awaiting or past human approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::TaskGraph;

/// Where a plan sits in its approval lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    PendingApproval,
    Approved,
    Rejected,
    Executing,
    Completed,
    Failed,
}

/// A planner output, stored so it can be reviewed, approved, and later
/// replayed against the DAG executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub goal_id: Uuid,
    pub graph: TaskGraph,
    pub status: PlanStatus,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl PlanRecord {
    pub fn requires_review(&self) -> bool {
        matches!(self.status, PlanStatus::PendingApproval)
    }
}
