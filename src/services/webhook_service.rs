//! Webhook Engine: registration, HMAC-signed delivery, and retry.
//!
//! Grounded on `original_source/api/webhooks.py`'s service-layer surface
//! (`register`/`list_for_tenant`/`delete`/`get`/`deliver`/`get_deliveries`)
//! reproduced here without the HTTP routing it sat behind.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::models::webhook::{DeliveryStatus, Webhook, WebhookDelivery, WebhookEventType};
use crate::domain::ports::{WebhookRepository, WebhookSender};

const MIN_SECRET_LEN: usize = 16;
const MAX_DELIVERY_ATTEMPTS: u32 = 3;
/// Delay, in seconds, before attempt `N` (1-indexed): immediate, then 1
/// minute, then 5 minutes.
const RETRY_DELAYS_SECS: [u64; 3] = [0, 60, 300];

fn hash_secret(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    hex::encode(digest)
}

pub async fn register(
    webhooks: &Arc<dyn WebhookRepository>,
    sender: &Arc<dyn WebhookSender>,
    tenant_id: Uuid,
    url: String,
    events: Vec<WebhookEventType>,
    secret: String,
) -> CoreResult<Webhook> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(CoreError::ValidationFailed(format!(
            "webhook secret must be at least {MIN_SECRET_LEN} characters"
        )));
    }
    if events.is_empty() {
        return Err(CoreError::ValidationFailed(
            "webhook must subscribe to at least one event type".to_string(),
        ));
    }
    if !sender.verify_endpoint(&url).await {
        return Err(CoreError::ValidationFailed(format!(
            "endpoint {url} is not reachable"
        )));
    }

    let webhook = Webhook {
        id: Uuid::new_v4(),
        tenant_id,
        url,
        events,
        secret_hash: hash_secret(&secret),
        is_active: true,
        created_at: Utc::now(),
    };
    webhooks.create(&webhook).await?;
    Ok(webhook)
}

pub async fn list_for_tenant(webhooks: &Arc<dyn WebhookRepository>, tenant_id: Uuid) -> CoreResult<Vec<Webhook>> {
    webhooks.list_for_tenant(tenant_id).await
}

pub async fn get(webhooks: &Arc<dyn WebhookRepository>, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<Webhook>> {
    webhooks.get(tenant_id, id).await
}

pub async fn delete(webhooks: &Arc<dyn WebhookRepository>, tenant_id: Uuid, id: Uuid) -> CoreResult<bool> {
    webhooks.delete(tenant_id, id).await
}

pub async fn get_deliveries(
    webhooks: &Arc<dyn WebhookRepository>,
    webhook_id: Uuid,
    limit: u32,
) -> CoreResult<Vec<WebhookDelivery>> {
    webhooks.list_deliveries(webhook_id, limit.max(1).min(50)).await
}

fn event_type_header(event_type: WebhookEventType) -> String {
    match event_type {
        WebhookEventType::AgentCompleted => "agent.completed",
        WebhookEventType::DocumentIngested => "document.ingested",
        WebhookEventType::FeedbackReceived => "feedback.received",
        WebhookEventType::ComplianceAlert => "compliance.alert",
        WebhookEventType::UserCreated => "user.created",
    }
    .to_string()
}

fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Delivers `event_type` with `payload` to every webhook subscribed to it,
/// recording one `WebhookDelivery` per endpoint regardless of outcome.
pub async fn deliver(
    webhooks: &Arc<dyn WebhookRepository>,
    sender: &Arc<dyn WebhookSender>,
    tenant_id: Uuid,
    event_type: WebhookEventType,
    payload: serde_json::Value,
) -> CoreResult<Vec<WebhookDelivery>> {
    let subscribed = webhooks.list_subscribed(tenant_id, event_type).await?;
    let mut deliveries = Vec::with_capacity(subscribed.len());
    for webhook in subscribed {
        let mut delivery = WebhookDelivery {
            id: Uuid::new_v4(),
            webhook_id: webhook.id,
            tenant_id,
            event_type,
            payload: payload.clone(),
            status: DeliveryStatus::Pending,
            attempt_count: 0,
            last_attempted_at: None,
            last_response_status: None,
            next_retry_at: None,
            created_at: Utc::now(),
        };
        webhooks.record_delivery(&delivery).await?;
        attempt_delivery(sender, &webhook, &mut delivery).await;
        webhooks.update_delivery(&delivery).await?;
        deliveries.push(delivery);
    }
    Ok(deliveries)
}

/// One delivery attempt: signs the payload and POSTs it, updating
/// `delivery` in place. Does not itself schedule a retry — that is
/// `retry_due_deliveries`'s job, run by a background task against
/// `WebhookRepository::list_due_for_retry`.
async fn attempt_delivery(sender: &Arc<dyn WebhookSender>, webhook: &Webhook, delivery: &mut WebhookDelivery) {
    let body = serde_json::to_vec(&delivery.payload).unwrap_or_default();
    let signature = sign(&webhook.secret_hash, &body);

    let mut headers = HashMap::new();
    headers.insert("X-EAP-Event".to_string(), event_type_header(delivery.event_type));
    headers.insert("X-EAP-Delivery-ID".to_string(), delivery.id.to_string());
    headers.insert("X-EAP-Signature-256".to_string(), format!("sha256={signature}"));

    delivery.attempt_count += 1;
    delivery.last_attempted_at = Some(Utc::now());

    let failed = |delivery: &mut WebhookDelivery| {
        if delivery.attempt_count >= MAX_DELIVERY_ATTEMPTS {
            delivery.status = DeliveryStatus::Exhausted;
            delivery.next_retry_at = None;
        } else {
            delivery.status = DeliveryStatus::Failed;
            delivery.next_retry_at =
                Some(Utc::now() + Duration::seconds(backoff_for_attempt(delivery.attempt_count) as i64));
        }
    };

    match sender.send(&webhook.url, headers, body).await {
        Ok(status) if (200..300).contains(&status) => {
            delivery.last_response_status = Some(status);
            delivery.status = DeliveryStatus::Delivered;
            delivery.next_retry_at = None;
        }
        Ok(status) => {
            delivery.last_response_status = Some(status);
            failed(delivery);
        }
        Err(_) => {
            failed(delivery);
        }
    }
}

/// Seconds to wait before the next attempt, given how many have already
/// been made (1 after the first attempt, 2 after the second).
pub fn backoff_for_attempt(attempt_count: u32) -> u64 {
    RETRY_DELAYS_SECS
        .get(attempt_count as usize)
        .copied()
        .unwrap_or(*RETRY_DELAYS_SECS.last().unwrap())
}

/// Re-delivers everything `WebhookRepository::list_due_for_retry` returns.
/// Intended to be driven by a periodic background task, not the request
/// path.
pub async fn retry_due_deliveries(
    webhooks: &Arc<dyn WebhookRepository>,
    sender: &Arc<dyn WebhookSender>,
    limit: u32,
) -> CoreResult<usize> {
    let due = webhooks.list_due_for_retry(limit).await?;
    let mut retried = 0;
    for mut delivery in due {
        let webhook = match webhooks.get(delivery.tenant_id, delivery.webhook_id).await? {
            Some(w) if w.is_active => w,
            _ => continue,
        };
        attempt_delivery(sender, &webhook, &mut delivery).await;
        webhooks.update_delivery(&delivery).await?;
        retried += 1;
    }
    Ok(retried)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_schedule_matches_the_documented_delays() {
        assert_eq!(backoff_for_attempt(1), 60);
        assert_eq!(backoff_for_attempt(2), 300);
    }

    #[test]
    fn signatures_are_deterministic_for_the_same_secret_and_body() {
        let a = sign("a-very-secret-value", b"payload");
        let b = sign("a-very-secret-value", b"payload");
        assert_eq!(a, b);
    }

    #[test]
    fn signatures_differ_across_secrets() {
        let a = sign("secret-one-value", b"payload");
        let b = sign("secret-two-value!", b"payload");
        assert_ne!(a, b);
    }

    #[test]
    fn tampering_one_byte_of_the_body_flips_the_signature() {
        let secret_hash = hash_secret("abcdef0123456789abcd");
        let body = br#"{"type":"agent.completed","data":{"x":1}}"#;
        let mut tampered = body.to_vec();
        *tampered.last_mut().unwrap() = b'!';

        assert_ne!(sign(&secret_hash, body), sign(&secret_hash, &tampered));
    }

    #[test]
    fn signing_key_is_the_hash_of_the_secret_not_the_raw_secret() {
        let raw = "abcdef0123456789abcd";
        let hash = hash_secret(raw);
        assert_ne!(hash, raw);
        assert_ne!(sign(raw, b"payload"), sign(&hash, b"payload"));
    }

    #[tokio::test]
    async fn a_delivered_attempt_carries_the_spec_header_shape() {
        struct CapturingSender {
            seen: tokio::sync::Mutex<Option<HashMap<String, String>>>,
        }

        #[async_trait::async_trait]
        impl WebhookSender for CapturingSender {
            async fn send(&self, _url: &str, headers: HashMap<String, String>, _body: Vec<u8>) -> CoreResult<u16> {
                *self.seen.lock().await = Some(headers);
                Ok(200)
            }

            async fn verify_endpoint(&self, _url: &str) -> bool {
                true
            }
        }

        let sender = Arc::new(CapturingSender {
            seen: tokio::sync::Mutex::new(None),
        });
        let webhook = Webhook {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            url: "https://example.test/hook".to_string(),
            events: vec![WebhookEventType::AgentCompleted],
            secret_hash: hash_secret("abcdef0123456789abcd"),
            is_active: true,
            created_at: Utc::now(),
        };
        let mut delivery = WebhookDelivery {
            id: Uuid::new_v4(),
            webhook_id: webhook.id,
            tenant_id: webhook.tenant_id,
            event_type: WebhookEventType::AgentCompleted,
            payload: serde_json::json!({"data": {"x": 1}}),
            status: DeliveryStatus::Pending,
            attempt_count: 0,
            last_attempted_at: None,
            last_response_status: None,
            next_retry_at: None,
            created_at: Utc::now(),
        };

        let sender_port: Arc<dyn WebhookSender> = sender.clone();
        attempt_delivery(&sender_port, &webhook, &mut delivery).await;

        assert_eq!(delivery.status, DeliveryStatus::Delivered);
        assert!(delivery.next_retry_at.is_none());

        let headers = sender.seen.lock().await.clone().expect("send was called");
        assert_eq!(headers.get("X-EAP-Event").unwrap(), "agent.completed");
        assert_eq!(headers.get("X-EAP-Delivery-ID").unwrap(), &delivery.id.to_string());
        assert!(headers.get("X-EAP-Signature-256").unwrap().starts_with("sha256="));
    }
}
