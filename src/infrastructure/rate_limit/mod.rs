//! In-memory `RateLimitStore`, reproducing the sorted-set sliding window
//! from `original_source/infra/redis_rate_limiter.py`'s Lua script without
//! Redis: a per-key timestamp list stands in for the sorted set, and a
//! single `RwLock` gives the same atomicity the script got from Redis
//! running it single-threaded. Distributed deployments need a shared
//! backend instead; see `[MODULE] Rate Limiting`'s Non-goals.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::errors::CoreResult;
use crate::domain::ports::rate_limit_store::{RateLimitOutcome, RateLimitStore};

#[derive(Default)]
pub struct InMemoryRateLimitStore {
    windows: Arc<RwLock<HashMap<String, Vec<DateTime<Utc>>>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn check_and_record(
        &self,
        key: &str,
        now: DateTime<Utc>,
        window_start: DateTime<Utc>,
        limit: u32,
    ) -> CoreResult<RateLimitOutcome> {
        let mut windows = self.windows.write().await;
        let entries = windows.entry(key.to_string()).or_default();

        entries.retain(|ts| *ts > window_start);

        let current_count = entries.len() as u32;
        if current_count >= limit {
            return Ok(RateLimitOutcome {
                allowed: false,
                current_count,
            });
        }

        entries.push(now);
        Ok(RateLimitOutcome {
            allowed: true,
            current_count: current_count + 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn requests_under_the_limit_are_allowed_and_counted() {
        let store = InMemoryRateLimitStore::new();
        let now = Utc::now();
        let window_start = now - Duration::seconds(60);

        for expected_count in 1..=3u32 {
            let outcome = store.check_and_record("tenant-a", now, window_start, 5).await.unwrap();
            assert!(outcome.allowed);
            assert_eq!(outcome.current_count, expected_count);
        }
    }

    #[tokio::test]
    async fn requests_at_the_limit_are_rejected_without_being_recorded() {
        let store = InMemoryRateLimitStore::new();
        let now = Utc::now();
        let window_start = now - Duration::seconds(60);

        for _ in 0..2 {
            store.check_and_record("tenant-a", now, window_start, 2).await.unwrap();
        }

        let outcome = store.check_and_record("tenant-a", now, window_start, 2).await.unwrap();
        assert!(!outcome.allowed);
        assert_eq!(outcome.current_count, 2);
    }

    #[tokio::test]
    async fn entries_older_than_the_window_start_are_dropped() {
        let store = InMemoryRateLimitStore::new();
        let old = Utc::now() - Duration::seconds(120);
        let recent_window_start = Utc::now() - Duration::seconds(60);

        store.check_and_record("tenant-a", old, old - Duration::seconds(60), 5).await.unwrap();

        let outcome = store
            .check_and_record("tenant-a", Utc::now(), recent_window_start, 5)
            .await
            .unwrap();
        assert!(outcome.allowed);
        assert_eq!(outcome.current_count, 1);
    }

    #[tokio::test]
    async fn distinct_keys_are_tracked_independently() {
        let store = InMemoryRateLimitStore::new();
        let now = Utc::now();
        let window_start = now - Duration::seconds(60);

        store.check_and_record("tenant-a", now, window_start, 1).await.unwrap();
        let outcome = store.check_and_record("tenant-b", now, window_start, 1).await.unwrap();

        assert!(outcome.allowed);
        assert_eq!(outcome.current_count, 1);
    }
}
