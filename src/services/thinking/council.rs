//! Council: multi-perspective deliberation over a question.
//!
//! Three rounds: independent perspectives run in parallel, each
//! perspective is then critiqued in parallel by the others, and a final
//! single synthesis call reconciles everything. If synthesis fails, the
//! fallback is the perspectives concatenated verbatim — a degraded but
//! still useful answer rather than an error.

use std::sync::Arc;

use crate::domain::errors::CoreResult;
use crate::domain::ports::llm_client::{ChatMessage, CompletionRequest};
use crate::domain::ports::LlmClient;

const DEFAULT_PERSPECTIVES: &[&str] = &["optimist", "skeptic", "pragmatist"];

#[derive(Debug, Clone)]
pub struct CouncilResult {
    pub perspectives: Vec<(String, String)>,
    pub critiques: Vec<(String, String)>,
    pub synthesis: String,
    pub synthesis_degraded: bool,
}

async fn ask(llm: &Arc<dyn LlmClient>, system: String, user: String) -> CoreResult<String> {
    let response = llm
        .complete(CompletionRequest {
            messages: vec![
                ChatMessage { role: "system".to_string(), content: system },
                ChatMessage { role: "user".to_string(), content: user },
            ],
            model: None,
            temperature: 0.7,
            max_tokens: 1024,
        })
        .await?;
    Ok(response.content)
}

pub async fn run_council(llm: &Arc<dyn LlmClient>, question: &str) -> CouncilResult {
    let perspective_calls = DEFAULT_PERSPECTIVES.iter().map(|persona| {
        let system = format!("You are a {persona} evaluating the following question.");
        ask(llm, system, question.to_string())
    });
    let perspective_results = futures::future::join_all(perspective_calls).await;
    let perspectives: Vec<(String, String)> = DEFAULT_PERSPECTIVES
        .iter()
        .zip(perspective_results)
        .map(|(persona, result)| ((*persona).to_string(), result.unwrap_or_default()))
        .collect();

    let critique_calls = perspectives.iter().map(|(persona, opinion)| {
        let others: String = perspectives
            .iter()
            .filter(|(p, _)| p != persona)
            .map(|(p, o)| format!("{p}: {o}"))
            .collect::<Vec<_>>()
            .join("\n");
        let system = format!("You are the {persona}. Critique the other perspectives below.");
        ask(llm, system, others)
    });
    let critique_results = futures::future::join_all(critique_calls).await;
    let critiques: Vec<(String, String)> = perspectives
        .iter()
        .zip(critique_results)
        .map(|((persona, _), result)| (persona.clone(), result.unwrap_or_default()))
        .collect();

    let combined = perspectives
        .iter()
        .chain(critiques.iter())
        .map(|(persona, text)| format!("{persona}: {text}"))
        .collect::<Vec<_>>()
        .join("\n\n");

    let synthesis_system =
        "Synthesize the perspectives and critiques below into one balanced answer.".to_string();
    match ask(llm, synthesis_system, combined).await {
        Ok(synthesis) => CouncilResult {
            perspectives,
            critiques,
            synthesis,
            synthesis_degraded: false,
        },
        Err(_) => {
            let fallback = perspectives
                .iter()
                .map(|(p, o)| format!("{p}: {o}"))
                .collect::<Vec<_>>()
                .join("\n\n");
            CouncilResult {
                perspectives,
                critiques,
                synthesis: fallback,
                synthesis_degraded: true,
            }
        }
    }
}
