//! Covers the red-team critical-finding scenario: a response that
//! contradicts its sources must be flagged for mandatory human review at
//! the lowest confidence band, without waiting on the aggregation call.

use std::sync::Arc;

use async_trait::async_trait;
use eap_core::domain::errors::CoreResult;
use eap_core::domain::ports::llm_client::{CompletionRequest, CompletionResponse};
use eap_core::domain::ports::LlmClient;
use eap_core::services::thinking::red_team::{run_red_team, Severity};

/// Always reports a critical contradiction from the factual-grounding
/// check and nothing from the others, mirroring a response that
/// contradicts its cited sources.
struct ContradictingSourcesLlm;

#[async_trait]
impl LlmClient for ContradictingSourcesLlm {
    async fn complete(&self, request: CompletionRequest) -> CoreResult<CompletionResponse> {
        let is_factual_check = request
            .messages
            .first()
            .is_some_and(|m| m.content.contains("supported by the sources"));

        let content = if is_factual_check {
            r#"{"findings":[{"severity":"critical","description":"claim contradicts cited source","evidence":["source says X, response claims not-X"],"recommendation":"remove or correct the claim"}]}"#
        } else {
            r#"{"findings":[]}"#
        };

        Ok(CompletionResponse {
            content: content.to_string(),
            model: "test-model".to_string(),
            prompt_tokens: 10,
            completion_tokens: 5,
        })
    }

    async fn embed(&self, _texts: Vec<String>, _model: Option<String>) -> CoreResult<Vec<Vec<f32>>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn a_response_contradicting_its_sources_forces_human_review() {
    let llm: Arc<dyn LlmClient> = Arc::new(ContradictingSourcesLlm);
    let sources = vec!["source says X".to_string()];

    let result = run_red_team(&llm, "The response claims not-X.", &sources).await;

    assert!(result.requires_human_review);
    assert_eq!(result.overall_severity, Severity::Critical);
    assert!((result.overall_confidence - 0.2).abs() < f32::EPSILON);
    assert!(result.review_reason.unwrap().contains("CRITICAL"));
}
