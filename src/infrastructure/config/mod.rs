//! Hierarchical configuration: defaults merged with a YAML file and then
//! environment variables, in that order, per the teacher's
//! `infrastructure::config` layering.

pub mod loader;

pub use loader::{Config, ConfigError, ConfigLoader, DatabaseConfig, LlmConfig, RateLimitConfig};
