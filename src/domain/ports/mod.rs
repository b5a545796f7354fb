//! Ports: trait boundaries between domain/services and infrastructure.
//!
//! Grounded on the teacher's `domain::ports` module layout — one trait per
//! aggregate, `#[async_trait]`, returning `CoreResult<T>`.

pub mod agent_registry;
pub mod audit_repository;
pub mod goal_repository;
pub mod llm_client;
pub mod memory_repository;
pub mod plan_repository;
pub mod rate_limit_store;
pub mod tenant_repository;
pub mod webhook_repository;
pub mod webhook_sender;

pub use agent_registry::AgentRegistry;
pub use audit_repository::AuditRepository;
pub use goal_repository::GoalRepository;
pub use llm_client::{CompletionRequest, CompletionResponse, LlmClient};
pub use memory_repository::MemoryRepository;
pub use plan_repository::PlanRepository;
pub use rate_limit_store::RateLimitStore;
pub use tenant_repository::{TenantRepository, UserRepository};
pub use webhook_repository::WebhookRepository;
pub use webhook_sender::WebhookSender;
