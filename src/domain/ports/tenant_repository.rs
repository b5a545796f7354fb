//! Persistence ports for `Tenant` and `User`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::CoreResult;
use crate::domain::models::{Tenant, TenantSettings, User};

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, tenant: &Tenant) -> CoreResult<()>;
    async fn get(&self, id: Uuid) -> CoreResult<Option<Tenant>>;
    async fn get_by_slug(&self, slug: &str) -> CoreResult<Option<Tenant>>;
    async fn list(&self) -> CoreResult<Vec<Tenant>>;
    async fn get_settings(&self, tenant_id: Uuid) -> CoreResult<TenantSettings>;
    async fn upsert_settings(&self, settings: &TenantSettings) -> CoreResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> CoreResult<()>;
    /// Creates the row only if none exists with this `(tenant_id,
    /// external_subject)` pair, returning the existing or newly created
    /// row either way. Used for just-in-time provisioning under
    /// concurrent first requests.
    async fn get_or_create(&self, user: &User) -> CoreResult<User>;
    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<User>>;
    async fn get_by_subject(&self, tenant_id: Uuid, external_subject: &str) -> CoreResult<Option<User>>;
    async fn touch_last_seen(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<()>;
    async fn list_by_tenant(&self, tenant_id: Uuid) -> CoreResult<Vec<User>>;
}
