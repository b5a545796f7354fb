//! PostgreSQL adapters implementing `domain::ports`' repository traits.

pub mod agent_repo;
pub mod audit_repo;
pub mod connection;
pub mod goal_repo;
pub mod memory_repo;
pub mod plan_repo;
pub mod tenant_repo;
pub mod webhook_repo;

pub use agent_repo::PgAgentRegistry;
pub use audit_repo::PgAuditRepository;
pub use connection::{create_pool, verify_connection, ConnectionError};
pub use goal_repo::PgGoalRepository;
pub use memory_repo::PgMemoryRepository;
pub use plan_repo::PgPlanRepository;
pub use tenant_repo::{PgTenantRepository, PgUserRepository};
pub use webhook_repo::PgWebhookRepository;
