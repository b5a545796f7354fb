//! LLM Client port.
//!
//! Grounded on `original_source/agent/llm.py`'s proxy wrapper: a single
//! completion shape regardless of the underlying provider, because the
//! proxy layer normalizes that. `embed` returns an empty vec immediately
//! for empty input, matching the Python client's short-circuit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::CoreResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl CompletionResponse {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> CoreResult<CompletionResponse>;

    /// Returns `Ok(vec![])` immediately if `texts` is empty.
    async fn embed(&self, texts: Vec<String>, model: Option<String>) -> CoreResult<Vec<Vec<f32>>>;
}
