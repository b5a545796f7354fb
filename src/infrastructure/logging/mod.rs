//! Structured logging, following the teacher's layered-subscriber
//! approach: a JSON or pretty stdout layer, an optional rolling file
//! layer, both filtered by the same `EnvFilter`.

pub mod config;
pub mod logger;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
