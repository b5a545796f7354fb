//! `Webhook` and `WebhookDelivery` persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::models::webhook::{DeliveryStatus, Webhook, WebhookDelivery, WebhookEventType};
use crate::domain::ports::WebhookRepository;

pub struct PgWebhookRepository {
    pool: PgPool,
}

impl PgWebhookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn event_to_str(event: WebhookEventType) -> &'static str {
    match event {
        WebhookEventType::AgentCompleted => "agent.completed",
        WebhookEventType::DocumentIngested => "document.ingested",
        WebhookEventType::FeedbackReceived => "feedback.received",
        WebhookEventType::ComplianceAlert => "compliance.alert",
        WebhookEventType::UserCreated => "user.created",
    }
}

fn event_from_str(s: &str) -> CoreResult<WebhookEventType> {
    Ok(match s {
        "agent.completed" => WebhookEventType::AgentCompleted,
        "document.ingested" => WebhookEventType::DocumentIngested,
        "feedback.received" => WebhookEventType::FeedbackReceived,
        "compliance.alert" => WebhookEventType::ComplianceAlert,
        "user.created" => WebhookEventType::UserCreated,
        other => return Err(CoreError::Internal(format!("unknown webhook event type '{other}' in database"))),
    })
}

#[derive(sqlx::FromRow)]
struct WebhookRow {
    id: Uuid,
    tenant_id: Uuid,
    url: String,
    events: Vec<String>,
    secret_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<WebhookRow> for Webhook {
    type Error = CoreError;

    fn try_from(row: WebhookRow) -> Result<Self, Self::Error> {
        let events = row.events.iter().map(|s| event_from_str(s)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            url: row.url,
            events,
            secret_hash: row.secret_hash,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DeliveryRow {
    id: Uuid,
    webhook_id: Uuid,
    tenant_id: Uuid,
    event_type: String,
    payload: Json<serde_json::Value>,
    status: String,
    attempt_count: i32,
    last_attempted_at: Option<DateTime<Utc>>,
    last_response_status: Option<i32>,
    next_retry_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

fn delivery_status_to_str(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Pending => "pending",
        DeliveryStatus::Delivered => "delivered",
        DeliveryStatus::Failed => "failed",
        DeliveryStatus::Exhausted => "exhausted",
    }
}

fn delivery_status_from_str(s: &str) -> DeliveryStatus {
    match s {
        "delivered" => DeliveryStatus::Delivered,
        "failed" => DeliveryStatus::Failed,
        "exhausted" => DeliveryStatus::Exhausted,
        _ => DeliveryStatus::Pending,
    }
}

impl TryFrom<DeliveryRow> for WebhookDelivery {
    type Error = CoreError;

    fn try_from(row: DeliveryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            webhook_id: row.webhook_id,
            tenant_id: row.tenant_id,
            event_type: event_from_str(&row.event_type)?,
            payload: row.payload.0,
            status: delivery_status_from_str(&row.status),
            attempt_count: row.attempt_count as u32,
            last_attempted_at: row.last_attempted_at,
            last_response_status: row.last_response_status.map(|s| s as u16),
            next_retry_at: row.next_retry_at,
            created_at: row.created_at,
        })
    }
}

const WEBHOOK_COLUMNS: &str = "id, tenant_id, url, events, secret_hash, is_active, created_at";
const DELIVERY_COLUMNS: &str =
    "id, webhook_id, tenant_id, event_type, payload, status, attempt_count, last_attempted_at, \
     last_response_status, next_retry_at, created_at";

#[async_trait]
impl WebhookRepository for PgWebhookRepository {
    async fn create(&self, webhook: &Webhook) -> CoreResult<()> {
        let events: Vec<&str> = webhook.events.iter().map(|e| event_to_str(*e)).collect();
        sqlx::query(&format!(
            "INSERT INTO webhooks ({WEBHOOK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(webhook.id)
        .bind(webhook.tenant_id)
        .bind(&webhook.url)
        .bind(&events)
        .bind(&webhook.secret_hash)
        .bind(webhook.is_active)
        .bind(webhook.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<Webhook>> {
        let row = sqlx::query_as::<_, WebhookRow>(&format!(
            "SELECT {WEBHOOK_COLUMNS} FROM webhooks WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Webhook::try_from).transpose()
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> CoreResult<Vec<Webhook>> {
        let rows = sqlx::query_as::<_, WebhookRow>(&format!(
            "SELECT {WEBHOOK_COLUMNS} FROM webhooks WHERE tenant_id = $1 ORDER BY created_at"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Webhook::try_from).collect()
    }

    async fn list_subscribed(&self, tenant_id: Uuid, event: WebhookEventType) -> CoreResult<Vec<Webhook>> {
        let rows = sqlx::query_as::<_, WebhookRow>(&format!(
            "SELECT {WEBHOOK_COLUMNS} FROM webhooks \
             WHERE tenant_id = $1 AND is_active = true AND $2 = ANY(events)"
        ))
        .bind(tenant_id)
        .bind(event_to_str(event))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Webhook::try_from).collect()
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM webhooks WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_delivery(&self, delivery: &WebhookDelivery) -> CoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO webhook_deliveries ({DELIVERY_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(delivery.id)
        .bind(delivery.webhook_id)
        .bind(delivery.tenant_id)
        .bind(event_to_str(delivery.event_type))
        .bind(Json(&delivery.payload))
        .bind(delivery_status_to_str(delivery.status))
        .bind(delivery.attempt_count as i32)
        .bind(delivery.last_attempted_at)
        .bind(delivery.last_response_status.map(i32::from))
        .bind(delivery.next_retry_at)
        .bind(delivery.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_delivery(&self, delivery: &WebhookDelivery) -> CoreResult<()> {
        sqlx::query(
            "UPDATE webhook_deliveries SET status = $2, attempt_count = $3, last_attempted_at = $4, \
             last_response_status = $5, next_retry_at = $6 WHERE id = $1",
        )
        .bind(delivery.id)
        .bind(delivery_status_to_str(delivery.status))
        .bind(delivery.attempt_count as i32)
        .bind(delivery.last_attempted_at)
        .bind(delivery.last_response_status.map(i32::from))
        .bind(delivery.next_retry_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_deliveries(&self, webhook_id: Uuid, limit: u32) -> CoreResult<Vec<WebhookDelivery>> {
        let rows = sqlx::query_as::<_, DeliveryRow>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM webhook_deliveries \
             WHERE webhook_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(webhook_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(WebhookDelivery::try_from).collect()
    }

    async fn list_due_for_retry(&self, limit: u32) -> CoreResult<Vec<WebhookDelivery>> {
        let rows = sqlx::query_as::<_, DeliveryRow>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM webhook_deliveries \
             WHERE status = 'failed' AND attempt_count < 3 AND next_retry_at <= now() \
             ORDER BY next_retry_at ASC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(WebhookDelivery::try_from).collect()
    }
}
