//! HTTP client for the proxy LLM endpoint.
//!
//! Grounded on the teacher's `infrastructure::claude::client::ClaudeClientImpl`
//! (connection-pooled `reqwest::Client`, status-code error classification,
//! retry-policy-wrapped request). Unlike the Claude client this talks to a
//! single proxy (`original_source/agent/llm.py` calls it `litellm_base_url`)
//! that already normalizes the provider underneath, so there is no
//! provider-specific request shaping here.

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::errors::{CoreError, CoreResult};
use crate::domain::ports::llm_client::{ChatMessage, CompletionRequest, CompletionResponse, LlmClient};
use crate::infrastructure::config::LlmConfig;

use super::retry::RetryPolicy;

#[derive(Debug, Clone, Error)]
pub enum LlmTransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("authentication failed")]
    InvalidApiKey,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("proxy server error ({0}): {1}")]
    ServerError(StatusCode, String),
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("unexpected status {0}: {1}")]
    Unknown(StatusCode, String),
}

impl LlmTransportError {
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 => Self::InvalidRequest(body),
            401 | 403 => Self::InvalidApiKey,
            429 => Self::RateLimited,
            500 | 502 | 503 | 504 => Self::ServerError(status, body),
            _ => Self::Unknown(status, body),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerError(_, _) | Self::NetworkError(_))
    }
}

impl From<LlmTransportError> for CoreError {
    fn from(err: LlmTransportError) -> Self {
        CoreError::LlmUnavailable(err.to_string())
    }
}

#[derive(Serialize)]
struct ProxyCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ProxyCompletionChoice {
    message: ProxyCompletionMessage,
}

#[derive(Deserialize)]
struct ProxyCompletionMessage {
    content: String,
}

#[derive(Deserialize)]
struct ProxyUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct ProxyCompletionResponse {
    model: String,
    choices: Vec<ProxyCompletionChoice>,
    usage: ProxyUsage,
}

#[derive(Serialize)]
struct ProxyEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct ProxyEmbeddingDatum {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ProxyEmbeddingResponse {
    data: Vec<ProxyEmbeddingDatum>,
}

pub struct ProxyLlmClient {
    http: ReqwestClient,
    base_url: String,
    api_key: String,
    default_model: String,
    retry_policy: RetryPolicy,
}

impl ProxyLlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmTransportError> {
        let http = ReqwestClient::builder()
            .timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| LlmTransportError::NetworkError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            default_model: config.default_model.clone(),
            retry_policy: RetryPolicy {
                max_retries: config.retry_max_attempts,
                initial_backoff_ms: config.retry_initial_backoff_ms,
                max_backoff_ms: config.retry_max_backoff_ms,
            },
        })
    }

    async fn send_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmTransportError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let body = ProxyCompletionRequest {
            model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmTransportError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmTransportError::from_status(status, text));
        }

        let parsed: ProxyCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmTransportError::MalformedResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmTransportError::MalformedResponse("no choices in completion response".to_string()))?;

        Ok(CompletionResponse {
            content: choice.message.content,
            model: parsed.model,
            prompt_tokens: parsed.usage.prompt_tokens,
            completion_tokens: parsed.usage.completion_tokens,
        })
    }

    async fn send_embedding(&self, texts: &[String], model: &str) -> Result<Vec<Vec<f32>>, LlmTransportError> {
        let body = ProxyEmbeddingRequest { model, input: texts };

        let response = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmTransportError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmTransportError::from_status(status, text));
        }

        let parsed: ProxyEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| LlmTransportError::MalformedResponse(e.to_string()))?;

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl LlmClient for ProxyLlmClient {
    async fn complete(&self, request: CompletionRequest) -> CoreResult<CompletionResponse> {
        self.retry_policy
            .execute(|| self.send_completion(&request))
            .await
            .map_err(CoreError::from)
    }

    async fn embed(&self, texts: Vec<String>, model: Option<String>) -> CoreResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let model = model.unwrap_or_else(|| self.default_model.clone());
        self.retry_policy
            .execute(|| self.send_embedding(&texts, &model))
            .await
            .map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LlmConfig {
        LlmConfig {
            base_url: "http://localhost:4000".to_string(),
            api_key: "test-key".to_string(),
            default_model: "gpt-4o".to_string(),
            retry_max_attempts: 3,
            retry_initial_backoff_ms: 1_000,
            retry_max_backoff_ms: 10_000,
        }
    }

    #[test]
    fn client_construction_succeeds_with_valid_config() {
        assert!(ProxyLlmClient::new(&test_config()).is_ok());
    }

    #[test]
    fn status_codes_classify_into_the_right_variants() {
        assert!(matches!(
            LlmTransportError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            LlmTransportError::RateLimited
        ));
        assert!(matches!(
            LlmTransportError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            LlmTransportError::InvalidApiKey
        ));
        assert!(matches!(
            LlmTransportError::from_status(StatusCode::BAD_GATEWAY, String::new()),
            LlmTransportError::ServerError(_, _)
        ));
    }

    #[test]
    fn only_server_errors_rate_limits_and_network_errors_are_transient() {
        assert!(LlmTransportError::from_status(StatusCode::SERVICE_UNAVAILABLE, String::new()).is_transient());
        assert!(LlmTransportError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()).is_transient());
        assert!(!LlmTransportError::from_status(StatusCode::BAD_REQUEST, String::new()).is_transient());
        assert!(!LlmTransportError::from_status(StatusCode::UNAUTHORIZED, String::new()).is_transient());
    }

    #[tokio::test]
    async fn embed_short_circuits_on_empty_input() {
        let client = ProxyLlmClient::new(&test_config()).unwrap();
        let result = client.embed(Vec::new(), None).await.unwrap();
        assert!(result.is_empty());
    }
}
