//! Core of the multi-tenant enterprise agent platform: policy engine, goal
//! planner, DAG executor, thinking-tool pipeline, memory store, webhook
//! engine, rate limiter, and audit log.
//!
//! This crate is the Core only — HTTP routing, OIDC token validation, and
//! operational pool tuning are a hosting binary's responsibility. See
//! `infrastructure::http::health` for the one HTTP surface this crate
//! does own.

pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{CoreError, CoreResult};
