//! Covers the webhook HMAC and retry-schedule scenarios: an endpoint that
//! always returns 500 gets attempted up to the delivery ceiling, backing
//! off on the documented [0, 60, 300] second schedule, then settles as
//! exhausted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use eap_core::domain::errors::CoreResult;
use eap_core::domain::models::webhook::{DeliveryStatus, Webhook, WebhookDelivery, WebhookEventType};
use eap_core::domain::ports::{WebhookRepository, WebhookSender};
use eap_core::services::webhook_service;
use uuid::Uuid;

struct AlwaysServerErrorSender {
    calls: AtomicUsize,
}

#[async_trait]
impl WebhookSender for AlwaysServerErrorSender {
    async fn send(&self, _url: &str, _headers: HashMap<String, String>, _body: Vec<u8>) -> CoreResult<u16> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(500)
    }

    async fn verify_endpoint(&self, _url: &str) -> bool {
        true
    }
}

#[derive(Default)]
struct InMemoryWebhooks {
    webhooks: Mutex<HashMap<Uuid, Webhook>>,
    deliveries: Mutex<HashMap<Uuid, WebhookDelivery>>,
}

#[async_trait]
impl WebhookRepository for InMemoryWebhooks {
    async fn create(&self, webhook: &Webhook) -> CoreResult<()> {
        self.webhooks.lock().unwrap().insert(webhook.id, webhook.clone());
        Ok(())
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<Webhook>> {
        Ok(self
            .webhooks
            .lock()
            .unwrap()
            .get(&id)
            .filter(|w| w.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> CoreResult<Vec<Webhook>> {
        Ok(self
            .webhooks
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn list_subscribed(&self, tenant_id: Uuid, event: WebhookEventType) -> CoreResult<Vec<Webhook>> {
        Ok(self
            .webhooks
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.tenant_id == tenant_id && w.is_active && w.events.contains(&event))
            .cloned()
            .collect())
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<bool> {
        let mut webhooks = self.webhooks.lock().unwrap();
        if webhooks.get(&id).is_some_and(|w| w.tenant_id == tenant_id) {
            webhooks.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn record_delivery(&self, delivery: &WebhookDelivery) -> CoreResult<()> {
        self.deliveries.lock().unwrap().insert(delivery.id, delivery.clone());
        Ok(())
    }

    async fn update_delivery(&self, delivery: &WebhookDelivery) -> CoreResult<()> {
        self.deliveries.lock().unwrap().insert(delivery.id, delivery.clone());
        Ok(())
    }

    async fn list_deliveries(&self, webhook_id: Uuid, _limit: u32) -> CoreResult<Vec<WebhookDelivery>> {
        Ok(self
            .deliveries
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.webhook_id == webhook_id)
            .cloned()
            .collect())
    }

    /// Ignores `next_retry_at` rather than waiting out the real schedule:
    /// this fake plays the role of a background task running long after
    /// the delay has elapsed, not the delay itself.
    async fn list_due_for_retry(&self, limit: u32) -> CoreResult<Vec<WebhookDelivery>> {
        Ok(self
            .deliveries
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.status == DeliveryStatus::Failed && d.attempt_count < 3 && d.next_retry_at.is_some())
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[tokio::test]
async fn an_endpoint_that_always_fails_is_retried_until_exhausted() {
    let webhooks: std::sync::Arc<dyn WebhookRepository> = std::sync::Arc::new(InMemoryWebhooks::default());
    let sender: std::sync::Arc<dyn WebhookSender> = std::sync::Arc::new(AlwaysServerErrorSender {
        calls: AtomicUsize::new(0),
    });
    let tenant_id = Uuid::new_v4();

    let webhook = webhook_service::register(
        &webhooks,
        &sender,
        tenant_id,
        "https://example.test/hook".to_string(),
        vec![WebhookEventType::AgentCompleted],
        "abcdef0123456789abcd".to_string(),
    )
    .await
    .unwrap();

    let deliveries = webhook_service::deliver(
        &webhooks,
        &sender,
        tenant_id,
        WebhookEventType::AgentCompleted,
        serde_json::json!({"data": {"x": 1}}),
    )
    .await
    .unwrap();

    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].attempt_count, 1);
    assert_eq!(deliveries[0].status, DeliveryStatus::Failed);
    assert!(deliveries[0].next_retry_at.is_some());

    let retried = webhook_service::retry_due_deliveries(&webhooks, &sender, 10).await.unwrap();
    assert_eq!(retried, 1);
    let current = webhooks.list_deliveries(webhook.id, 10).await.unwrap();
    assert_eq!(current[0].attempt_count, 2);
    assert_eq!(current[0].status, DeliveryStatus::Failed);
    assert!(current[0].next_retry_at.is_some());

    let retried = webhook_service::retry_due_deliveries(&webhooks, &sender, 10).await.unwrap();
    assert_eq!(retried, 1);
    let current = webhooks.list_deliveries(webhook.id, 10).await.unwrap();
    assert_eq!(current[0].attempt_count, 3);
    assert_eq!(current[0].status, DeliveryStatus::Exhausted);
    assert!(current[0].next_retry_at.is_none());

    let exhausted_again = webhook_service::retry_due_deliveries(&webhooks, &sender, 10).await.unwrap();
    assert_eq!(exhausted_again, 0);
}

#[test]
fn backoff_seconds_match_the_documented_schedule() {
    assert_eq!(webhook_service::backoff_for_attempt(1), 60);
    assert_eq!(webhook_service::backoff_for_attempt(2), 300);
}
