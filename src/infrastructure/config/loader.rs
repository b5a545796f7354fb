//! Config loading and validation.
//!
//! Grounded on the teacher's `infrastructure::config::loader::ConfigLoader`:
//! a Figment chain of `Serialized::defaults` -> `Yaml::file` -> `Env`, then
//! a hand-written `validate` pass that turns obviously-wrong values into a
//! typed error before anything downstream sees them.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::logging::config::LogConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    30
}
fn default_min_connections() -> u32 {
    2
}
fn default_acquire_timeout_secs() -> u64 {
    30
}
fn default_idle_timeout_secs() -> u64 {
    3600
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/eap".to_string(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub default_model: String,
    #[serde(default = "default_retry_attempts")]
    pub retry_max_attempts: u32,
    #[serde(default = "default_retry_initial_backoff_ms")]
    pub retry_initial_backoff_ms: u64,
    #[serde(default = "default_retry_max_backoff_ms")]
    pub retry_max_backoff_ms: u64,
}

fn default_llm_model() -> String {
    "gpt-4o".to_string()
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_initial_backoff_ms() -> u64 {
    1_000
}
fn default_retry_max_backoff_ms() -> u64 {
    10_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            api_key: String::new(),
            default_model: default_llm_model(),
            retry_max_attempts: default_retry_attempts(),
            retry_initial_backoff_ms: default_retry_initial_backoff_ms(),
            retry_max_backoff_ms: default_retry_max_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub logging: LogConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),
    #[error("database.url must not be empty")]
    EmptyDatabaseUrl,
    #[error("database.max_connections must be greater than 0")]
    InvalidMaxConnections,
    #[error("database.min_connections must not exceed max_connections")]
    InvalidMinConnections,
    #[error("llm.base_url must not be empty")]
    EmptyLlmBaseUrl,
    #[error("llm.retry_initial_backoff_ms must be less than llm.retry_max_backoff_ms")]
    InvalidRetryBackoff,
    #[error("logging.level '{0}' is not a recognized level")]
    InvalidLogLevel(String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_from_file(".eap/config.yaml")
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Yaml::file(".eap/local.yaml"))
            .merge(Env::prefixed("EAP_").split("__"))
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.url.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections);
        }
        if config.database.min_connections > config.database.max_connections {
            return Err(ConfigError::InvalidMinConnections);
        }
        if config.llm.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyLlmBaseUrl);
        }
        if config.llm.retry_initial_backoff_ms >= config.llm.retry_max_backoff_ms {
            return Err(ConfigError::InvalidRetryBackoff);
        }
        const VALID_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        if !VALID_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = Config::default();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn empty_database_url_is_rejected() {
        let mut config = Config::default();
        config.database.url = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabaseUrl)
        ));
    }

    #[test]
    fn backoff_ordering_is_enforced() {
        let mut config = Config::default();
        config.llm.retry_initial_backoff_ms = 20_000;
        config.llm.retry_max_backoff_ms = 10_000;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRetryBackoff)
        ));
    }
}
