//! Rate Limiter: sliding-window request throttling, keyed per tenant.
//!
//! Grounded on `original_source/infra/redis_rate_limiter.py`'s Lua script:
//! drop entries older than the window, count what is left, and either
//! reject or record the new entry — as one atomic step. Here the atomic
//! step is `RateLimitStore::check_and_record`; this module only computes
//! the window and the effective limit (`requests_per_minute +
//! burst_allowance`) and interprets the outcome.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::models::TenantSettings;
use crate::domain::ports::rate_limit_store::RateLimitStore;

const WINDOW_SECONDS: i64 = 60;

fn key_for(tenant_id: Uuid) -> String {
    format!("rate_limit:{tenant_id}")
}

/// Returns `Ok(())` if the request is allowed, or
/// `CoreError::RateLimited` naming how long until the window frees up.
pub async fn check(
    store: &Arc<dyn RateLimitStore>,
    tenant_id: Uuid,
    settings: &TenantSettings,
) -> CoreResult<()> {
    let limit = settings.requests_per_minute + settings.burst_allowance;
    let now = Utc::now();
    let window_start = now - Duration::seconds(WINDOW_SECONDS);

    let outcome = store
        .check_and_record(&key_for(tenant_id), now, window_start, limit)
        .await?;

    if outcome.allowed {
        Ok(())
    } else {
        Err(CoreError::RateLimited {
            retry_after_secs: WINDOW_SECONDS as u64,
        })
    }
}
