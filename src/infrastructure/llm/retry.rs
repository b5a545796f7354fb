//! Retry policy for LLM calls.
//!
//! Numeric parameters are taken from `original_source/agent/llm.py`'s
//! `tenacity` decorator (`stop_after_attempt(3)`,
//! `wait_exponential(multiplier=1, min=1, max=10)`), not from the
//! teacher's Claude-API retry (which uses a much longer 10s-300s window
//! for a different upstream). `execute` only retries transient errors;
//! anything else is returned immediately.

use std::future::Future;
use std::time::Duration;

use super::client::LlmTransportError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let scaled = self.initial_backoff_ms.saturating_mul(1u64 << attempt.min(16));
        Duration::from_millis(scaled.min(self.max_backoff_ms))
    }

    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, LlmTransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmTransportError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    tokio::time::sleep(self.calculate_backoff(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_clamped_to_the_configured_maximum() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.calculate_backoff(0).as_millis(), 1_000);
        assert_eq!(policy.calculate_backoff(1).as_millis(), 2_000);
        assert_eq!(policy.calculate_backoff(10).as_millis(), 10_000);
    }
}
