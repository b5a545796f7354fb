//! Flat error taxonomy for the platform core.
//!
//! Mirrors the teacher's `domain::errors::DomainError`: one enum, `#[from]`
//! conversions at the persistence boundary, and a documented intended HTTP
//! status per variant so a hosting gateway can map errors without
//! re-deriving the policy here.

use uuid::Uuid;

/// Errors surfaced by the platform core to its callers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// 404 — also returned for cross-tenant access attempts, deliberately
    /// indistinguishable from "does not exist" to avoid leaking existence.
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: Uuid },

    /// 403 — insufficient role. Never names the role required; see
    /// `services::policy`.
    #[error("insufficient permissions")]
    PermissionDenied,

    /// 400
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// 409
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    /// 422 — graph failed to validate (cycle, missing dependency)
    #[error("task graph is invalid: {0}")]
    InvalidGraph(String),

    /// 429
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// 502 — upstream LLM failure after retries exhausted
    #[error("llm request failed: {0}")]
    LlmUnavailable(String),

    /// 500
    #[error("database error: {0}")]
    Database(String),

    /// 500
    #[error("serialization error: {0}")]
    Serialization(String),

    /// 500 — catch-all for conditions that should not occur
    #[error("internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<crate::domain::models::task::DagError> for CoreError {
    fn from(err: crate::domain::models::task::DagError) -> Self {
        Self::InvalidGraph(err.to_string())
    }
}
