//! Infrastructure: adapters that implement `domain::ports` against real
//! external systems — Postgres, the LLM proxy, outbound HTTP, config
//! files, and the logging subsystem.

pub mod auth;
pub mod config;
pub mod database;
pub mod http;
pub mod llm;
pub mod logging;
pub mod rate_limit;
