//! `reqwest`-backed `WebhookSender`.
//!
//! Grounded on the teacher's `infrastructure::claude::client` connection
//! handling, scaled down: webhook delivery has no rate limiter or retry
//! policy of its own because `services::webhook_service` already owns
//! attempt counting and backoff scheduling (`[MODULE] Webhook Delivery
//! Invariants`). This adapter only knows how to make one attempt.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;

use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::ports::WebhookSender;

pub struct ReqwestWebhookSender {
    http: ReqwestClient,
}

impl ReqwestWebhookSender {
    pub fn new() -> Self {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("default reqwest client configuration is always valid");
        Self { http }
    }
}

impl Default for ReqwestWebhookSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookSender for ReqwestWebhookSender {
    async fn send(&self, url: &str, headers: HashMap<String, String>, body: Vec<u8>) -> CoreResult<u16> {
        let mut request = self.http.post(url).body(body);
        for (key, value) in headers {
            request = request.header(key, value);
        }
        let response = request
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("webhook delivery request failed: {e}")))?;
        Ok(response.status().as_u16())
    }

    async fn verify_endpoint(&self, url: &str) -> bool {
        self.http
            .head(url)
            .timeout(Duration::from_secs(3))
            .send()
            .await
            .is_ok()
    }
}
