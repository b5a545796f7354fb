//! Tenant and just-in-time user provisioning.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::tenant::{Role, User};
use crate::domain::ports::{TenantRepository, UserRepository};

/// Provisions a user on first authenticated request.
///
/// Two concurrent requests for the same brand-new `(tenant_id,
/// external_subject)` pair must not create two rows; the repository's
/// `get_or_create` is expected to do this with an `ON CONFLICT DO NOTHING`
/// insert followed by a re-read, not with a check-then-insert race.
pub async fn provision_user(
    users: &Arc<dyn UserRepository>,
    tenant_id: Uuid,
    external_subject: &str,
    email: &str,
    default_role: Role,
) -> CoreResult<User> {
    let candidate = User {
        id: Uuid::new_v4(),
        tenant_id,
        external_subject: external_subject.to_string(),
        email: email.to_string(),
        role: default_role,
        created_at: Utc::now(),
        last_seen_at: Some(Utc::now()),
    };
    let user = users.get_or_create(&candidate).await?;
    users.touch_last_seen(tenant_id, user.id).await?;
    Ok(user)
}

pub async fn get_settings(
    tenants: &Arc<dyn TenantRepository>,
    tenant_id: Uuid,
) -> CoreResult<crate::domain::models::TenantSettings> {
    tenants.get_settings(tenant_id).await
}
