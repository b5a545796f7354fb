//! Tenant, user, and tenant-settings domain models.
//!
//! A `Tenant` is the root of isolation: every other entity in the
//! platform is owned by exactly one tenant, and every repository query
//! must be filtered by `tenant_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A billable, isolated customer organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Role a user holds within a tenant. Ordered: `Viewer < Operator < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Operator,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Operator => "operator",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A principal scoped to exactly one tenant.
///
/// Users are provisioned just-in-time on first authenticated request; see
/// `services::tenant_service::provision_user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub external_subject: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Per-tenant tunables that affect the platform's runtime behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSettings {
    pub tenant_id: Uuid,
    pub max_concurrent_tasks: u32,
    pub requests_per_minute: u32,
    pub burst_allowance: u32,
    pub require_red_team_review: bool,
    pub default_llm_model: String,
    pub updated_at: DateTime<Utc>,
}

impl TenantSettings {
    pub fn defaults(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            max_concurrent_tasks: 4,
            requests_per_minute: 60,
            burst_allowance: 0,
            require_red_team_review: true,
            default_llm_model: "gpt-4o".to_string(),
            updated_at: Utc::now(),
        }
    }
}
