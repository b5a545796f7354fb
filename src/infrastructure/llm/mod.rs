//! LLM Client: a thin, retrying wrapper around a single proxy endpoint.

pub mod client;
pub mod retry;

pub use client::ProxyLlmClient;
pub use retry::RetryPolicy;
