//! First Principles: bounded recursive decomposition of a question into
//! its underlying fundamentals.
//!
//! Each node asks the LLM to break itself into at most `MAX_BRANCHES`
//! sub-questions, down to `MAX_DEPTH`. Leaves are collected and sent
//! through one final synthesis call. If decomposition produces no leaves
//! at all (every branch failed to parse), synthesis is skipped and the
//! original question is returned verbatim.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::domain::ports::llm_client::{ChatMessage, CompletionRequest};
use crate::domain::ports::LlmClient;

const MAX_DEPTH: u32 = 4;
const MAX_BRANCHES: usize = 3;

#[derive(Debug, Clone)]
pub struct FirstPrinciplesResult {
    pub leaves: Vec<String>,
    pub fundamentals: String,
    pub fundamentals_degraded: bool,
}

#[derive(Debug, Deserialize)]
struct Decomposition {
    #[serde(default)]
    sub_questions: Vec<String>,
    /// Set by the model when it judges the question already fundamental.
    #[serde(default)]
    is_fundamental: bool,
}

fn decompose_node<'a>(
    llm: &'a Arc<dyn LlmClient>,
    question: String,
    depth: u32,
) -> Pin<Box<dyn Future<Output = Vec<String>> + Send + 'a>> {
    Box::pin(async move {
        if depth >= MAX_DEPTH {
            return vec![question];
        }

        let response = llm
            .complete(CompletionRequest {
                messages: vec![
                    ChatMessage {
                        role: "system".to_string(),
                        content: "Break the question into at most 3 more fundamental \
                                  sub-questions, or say it is already fundamental. \
                                  Respond as JSON only: {\"is_fundamental\": bool, \
                                  \"sub_questions\": [string]}."
                            .to_string(),
                    },
                    ChatMessage {
                        role: "user".to_string(),
                        content: question.clone(),
                    },
                ],
                model: None,
                temperature: 0.3,
                max_tokens: 512,
            })
            .await;

        let parsed = match response {
            Ok(r) => serde_json::from_str::<Decomposition>(&r.content).ok(),
            Err(_) => None,
        };

        match parsed {
            Some(d) if d.is_fundamental || d.sub_questions.is_empty() => vec![question],
            Some(d) => {
                let branches = d.sub_questions.into_iter().take(MAX_BRANCHES);
                let futures = branches.map(|sub| decompose_node(llm, sub, depth + 1));
                futures::future::join_all(futures)
                    .await
                    .into_iter()
                    .flatten()
                    .collect()
            }
            None => vec![question],
        }
    })
}

pub async fn run_first_principles(llm: &Arc<dyn LlmClient>, question: &str) -> FirstPrinciplesResult {
    let leaves = decompose_node(llm, question.to_string(), 0).await;

    if leaves.is_empty() {
        return FirstPrinciplesResult {
            leaves,
            fundamentals: question.to_string(),
            fundamentals_degraded: true,
        };
    }

    let leaves_text = leaves.join("\n- ");
    let synthesis = llm
        .complete(CompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "State the fundamentals these sub-questions reduce to, as a \
                              short list of grounded claims."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("- {leaves_text}"),
                },
            ],
            model: None,
            temperature: 0.3,
            max_tokens: 768,
        })
        .await;

    match synthesis {
        Ok(response) => FirstPrinciplesResult {
            leaves,
            fundamentals: response.content,
            fundamentals_degraded: false,
        },
        Err(_) => FirstPrinciplesResult {
            leaves: leaves.clone(),
            fundamentals: leaves.join("\n"),
            fundamentals_degraded: true,
        },
    }
}
