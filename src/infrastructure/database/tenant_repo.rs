//! `Tenant` and `User` persistence.
//!
//! Uses runtime `sqlx::query_as`, not the `query!` macros, matching the
//! teacher's `adapters::sqlite` style — no `DATABASE_URL` needed to build.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::models::tenant::Role;
use crate::domain::models::{Tenant, TenantSettings, User};
use crate::domain::ports::{TenantRepository, UserRepository};

pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
    is_active: bool,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
            is_active: row.is_active,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TenantSettingsRow {
    tenant_id: Uuid,
    max_concurrent_tasks: i32,
    requests_per_minute: i32,
    burst_allowance: i32,
    require_red_team_review: bool,
    default_llm_model: String,
    updated_at: DateTime<Utc>,
}

impl From<TenantSettingsRow> for TenantSettings {
    fn from(row: TenantSettingsRow) -> Self {
        Self {
            tenant_id: row.tenant_id,
            max_concurrent_tasks: row.max_concurrent_tasks as u32,
            requests_per_minute: row.requests_per_minute as u32,
            burst_allowance: row.burst_allowance as u32,
            require_red_team_review: row.require_red_team_review,
            default_llm_model: row.default_llm_model,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn create(&self, tenant: &Tenant) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO tenants (id, name, slug, created_at, is_active) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(tenant.created_at)
        .bind(tenant.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(
            "SELECT id, name, slug, created_at, is_active FROM tenants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Tenant::from))
    }

    async fn get_by_slug(&self, slug: &str) -> CoreResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(
            "SELECT id, name, slug, created_at, is_active FROM tenants WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Tenant::from))
    }

    async fn list(&self) -> CoreResult<Vec<Tenant>> {
        let rows = sqlx::query_as::<_, TenantRow>(
            "SELECT id, name, slug, created_at, is_active FROM tenants ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Tenant::from).collect())
    }

    async fn get_settings(&self, tenant_id: Uuid) -> CoreResult<TenantSettings> {
        let row = sqlx::query_as::<_, TenantSettingsRow>(
            "SELECT tenant_id, max_concurrent_tasks, requests_per_minute, burst_allowance, \
             require_red_team_review, default_llm_model, updated_at \
             FROM tenant_settings WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(TenantSettings::from)
            .unwrap_or_else(|| TenantSettings::defaults(tenant_id)))
    }

    async fn upsert_settings(&self, settings: &TenantSettings) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO tenant_settings \
             (tenant_id, max_concurrent_tasks, requests_per_minute, burst_allowance, \
              require_red_team_review, default_llm_model, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (tenant_id) DO UPDATE SET \
               max_concurrent_tasks = EXCLUDED.max_concurrent_tasks, \
               requests_per_minute = EXCLUDED.requests_per_minute, \
               burst_allowance = EXCLUDED.burst_allowance, \
               require_red_team_review = EXCLUDED.require_red_team_review, \
               default_llm_model = EXCLUDED.default_llm_model, \
               updated_at = EXCLUDED.updated_at",
        )
        .bind(settings.tenant_id)
        .bind(settings.max_concurrent_tasks as i32)
        .bind(settings.requests_per_minute as i32)
        .bind(settings.burst_allowance as i32)
        .bind(settings.require_red_team_review)
        .bind(&settings.default_llm_model)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    tenant_id: Uuid,
    external_subject: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    last_seen_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = CoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = match row.role.as_str() {
            "viewer" => Role::Viewer,
            "operator" => Role::Operator,
            "admin" => Role::Admin,
            other => return Err(CoreError::Internal(format!("unknown role '{other}' in database"))),
        };
        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            external_subject: row.external_subject,
            email: row.email,
            role,
            created_at: row.created_at,
            last_seen_at: row.last_seen_at,
        })
    }
}

const USER_COLUMNS: &str = "id, tenant_id, external_subject, email, role, created_at, last_seen_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, tenant_id, external_subject, email, role, created_at, last_seen_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(user.tenant_id)
        .bind(&user.external_subject)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.last_seen_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_or_create(&self, user: &User) -> CoreResult<User> {
        sqlx::query(
            "INSERT INTO users (id, tenant_id, external_subject, email, role, created_at, last_seen_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (tenant_id, external_subject) DO NOTHING",
        )
        .bind(user.id)
        .bind(user.tenant_id)
        .bind(&user.external_subject)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.last_seen_at)
        .execute(&self.pool)
        .await?;

        self.get_by_subject(user.tenant_id, &user.external_subject)
            .await?
            .ok_or_else(|| CoreError::Internal("user row vanished immediately after insert".to_string()))
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn get_by_subject(&self, tenant_id: Uuid, external_subject: &str) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE tenant_id = $1 AND external_subject = $2"
        ))
        .bind(tenant_id)
        .bind(external_subject)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn touch_last_seen(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<()> {
        sqlx::query("UPDATE users SET last_seen_at = now() WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> CoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE tenant_id = $1 ORDER BY created_at"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }
}
