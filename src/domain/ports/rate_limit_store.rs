//! Rate limit storage port.
//!
//! Grounded on `original_source/infra/redis_rate_limiter.py`: the
//! production backend is an external store (out of scope here per the
//! Redis-storage Non-goal), reached through this trait so the sliding
//! window algorithm in `services::rate_limiter` is identical whether it
//! runs against the in-memory adapter this crate ships or a future
//! distributed one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::CoreResult;

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Drops entries older than `window_start`, then returns the current
    /// count and, if under `limit`, records `now` as a new entry — all as
    /// one atomic step from the caller's perspective.
    async fn check_and_record(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window_start: DateTime<Utc>,
        limit: u32,
    ) -> CoreResult<RateLimitOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitOutcome {
    pub allowed: bool,
    pub current_count: u32,
}
