//! Persistence port for `Webhook` and `WebhookDelivery`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::{Webhook, WebhookDelivery};

#[async_trait]
pub trait WebhookRepository: Send + Sync {
    async fn create(&self, webhook: &Webhook) -> CoreResult<()>;
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<Webhook>>;
    async fn list_for_tenant(&self, tenant_id: Uuid) -> CoreResult<Vec<Webhook>>;
    /// Active webhooks subscribed to this event type, for fan-out on
    /// delivery.
    async fn list_subscribed(
        &self,
        tenant_id: Uuid,
        event: crate::domain::models::webhook::WebhookEventType,
    ) -> CoreResult<Vec<Webhook>>;
    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<bool>;

    async fn record_delivery(&self, delivery: &WebhookDelivery) -> CoreResult<()>;
    async fn update_delivery(&self, delivery: &WebhookDelivery) -> CoreResult<()>;
    async fn list_deliveries(&self, webhook_id: Uuid, limit: u32) -> CoreResult<Vec<WebhookDelivery>>;
    /// Deliveries still `Pending`/`Failed` and under the retry ceiling,
    /// due for another attempt.
    async fn list_due_for_retry(&self, limit: u32) -> CoreResult<Vec<WebhookDelivery>>;
}
