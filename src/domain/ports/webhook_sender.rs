//! Outbound HTTP delivery port for webhooks, kept separate from
//! `WebhookRepository` so the service logic (signing, retry scheduling)
//! never depends on `reqwest` directly.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::errors::CoreResult;

#[async_trait]
pub trait WebhookSender: Send + Sync {
    /// Performs the POST and returns the response status code, or an
    /// error if the request could not be sent at all (DNS failure,
    /// connection refused, timeout).
    async fn send(&self, url: &str, headers: HashMap<String, String>, body: Vec<u8>) -> CoreResult<u16>;

    /// A cheap reachability check used at registration time.
    async fn verify_endpoint(&self, url: &str) -> bool;
}
