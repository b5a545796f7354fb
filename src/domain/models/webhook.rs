//! Webhook registration and delivery records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event types a webhook may subscribe to. A closed set: registration
/// rejects anything outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "agent.completed")]
    AgentCompleted,
    #[serde(rename = "document.ingested")]
    DocumentIngested,
    #[serde(rename = "feedback.received")]
    FeedbackReceived,
    #[serde(rename = "compliance.alert")]
    ComplianceAlert,
    #[serde(rename = "user.created")]
    UserCreated,
}

impl WebhookEventType {
    pub fn all() -> &'static [WebhookEventType] {
        use WebhookEventType::*;
        &[AgentCompleted, DocumentIngested, FeedbackReceived, ComplianceAlert, UserCreated]
    }
}

/// A tenant's registered delivery endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub url: String,
    pub events: Vec<WebhookEventType>,
    /// SHA-256 hash of the shared secret, hex-encoded. The raw secret is
    /// shown to the caller once at registration and never stored; this
    /// hash is also the HMAC-SHA256 key used to sign outbound payloads.
    #[serde(skip_serializing)]
    pub secret_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one delivery attempt (including retries) for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Delivered,
    Failed,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookDelivery {
    pub id: Uuid,
    pub webhook_id: Uuid,
    pub tenant_id: Uuid,
    pub event_type: WebhookEventType,
    pub payload: serde_json::Value,
    pub status: DeliveryStatus,
    pub attempt_count: u32,
    pub last_attempted_at: Option<DateTime<Utc>>,
    pub last_response_status: Option<u16>,
    /// When the next retry is due. `None` once the delivery has reached a
    /// terminal state (`Delivered` or `Exhausted`).
    pub next_retry_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
