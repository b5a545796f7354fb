//! Red Team: adversarial review of a response against its claimed
//! sources.
//!
//! Grounded on `original_source/agent/thinking/red_team.py`. Four checks
//! run concurrently; a check that errors becomes a synthetic `HIGH`
//! "system_error" finding rather than failing the whole pass. If any
//! finding is `Critical`, aggregation short-circuits without another LLM
//! call — a critical finding is reason enough to escalate on its own.
//! Otherwise an aggregation call produces the human-review verdict; if
//! that call's response fails to parse, the fallback is conservative:
//! flag for review when any `High` finding exists, confidence 0.6 in
//! that case or 0.8 otherwise.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::errors::CoreResult;
use crate::domain::ports::llm_client::{ChatMessage, CompletionRequest};
use crate::domain::ports::LlmClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone)]
pub struct AdversarialFinding {
    pub category: String,
    pub severity: Severity,
    pub description: String,
    pub evidence: Vec<String>,
    pub recommendation: String,
}

#[derive(Debug, Clone)]
pub struct RedTeamResult {
    pub findings: Vec<AdversarialFinding>,
    pub overall_severity: Severity,
    pub requires_human_review: bool,
    pub overall_confidence: f32,
    pub review_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFinding {
    severity: String,
    description: String,
    #[serde(default)]
    evidence: Vec<String>,
    recommendation: String,
}

#[derive(Debug, Deserialize)]
struct RawFindings {
    findings: Vec<RawFinding>,
}

#[derive(Debug, Deserialize)]
struct AggregationVerdict {
    requires_human_review: bool,
    overall_confidence: f32,
    review_reason: Option<String>,
}

fn parse_severity(raw: &str) -> Severity {
    match raw.to_lowercase().as_str() {
        "critical" => Severity::Critical,
        "high" => Severity::High,
        "medium" => Severity::Medium,
        _ => Severity::Low,
    }
}

async fn run_check(
    llm: &Arc<dyn LlmClient>,
    category: &'static str,
    system_message: &str,
    user_message: String,
) -> Vec<AdversarialFinding> {
    let result: CoreResult<_> = llm
        .complete(CompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: format!("{system_message} Always respond with valid JSON only."),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_message,
                },
            ],
            model: None,
            temperature: 0.2,
            max_tokens: 1024,
        })
        .await;

    match result {
        Ok(response) => match serde_json::from_str::<RawFindings>(&response.content) {
            Ok(parsed) => parsed
                .findings
                .into_iter()
                .map(|f| AdversarialFinding {
                    category: category.to_string(),
                    severity: parse_severity(&f.severity),
                    description: f.description,
                    evidence: f.evidence,
                    recommendation: f.recommendation,
                })
                .collect(),
            Err(_) => Vec::new(),
        },
        Err(err) => vec![AdversarialFinding {
            category: "system_error".to_string(),
            severity: Severity::High,
            description: format!("Red team check failed: {}", truncate(&err.to_string(), 100)),
            evidence: Vec::new(),
            recommendation: "Retry analysis or escalate to human review".to_string(),
        }],
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

/// Runs the four adversarial checks against `response`, given the sources
/// it claims to draw on, then aggregates into a single verdict.
pub async fn run_red_team(llm: &Arc<dyn LlmClient>, response: &str, sources: &[String]) -> RedTeamResult {
    let sources_excerpt = truncate(&sources.iter().take(5).cloned().collect::<Vec<_>>().join("\n"), 3000);

    let checks = vec![
        run_check(
            llm,
            "factual_grounding",
            "Check whether every factual claim in the response is supported by the sources.",
            format!(
                "Response:\n{response}\n\nSources:\n{sources_excerpt}\n\nRespond as JSON: \
                 {{\"findings\":[{{\"severity\",\"description\",\"evidence\":[...],\"recommendation\"}}]}}"
            ),
        ),
        run_check(
            llm,
            "logical_consistency",
            "Check the response for internal contradictions or non-sequiturs.",
            format!("Response:\n{response}"),
        ),
        run_check(
            llm,
            "scope_overreach",
            "Check whether the response claims authority or certainty beyond what the sources support.",
            format!("Response:\n{response}\n\nSources:\n{sources_excerpt}"),
        ),
        run_check(
            llm,
            "harmful_guidance",
            "Check whether the response could cause harm if followed literally.",
            format!("Response:\n{response}"),
        ),
    ];

    let results = futures::future::join_all(checks).await;
    let findings: Vec<AdversarialFinding> = results.into_iter().flatten().collect();

    aggregate(llm, findings, response).await
}

async fn aggregate(llm: &Arc<dyn LlmClient>, mut findings: Vec<AdversarialFinding>, response: &str) -> RedTeamResult {
    if findings.is_empty() {
        return RedTeamResult {
            findings,
            overall_severity: Severity::Low,
            requires_human_review: false,
            overall_confidence: 1.0,
            review_reason: None,
        };
    }

    findings.sort_by(|a, b| b.severity.cmp(&a.severity));
    let overall_severity = findings[0].severity;

    let critical_categories: Vec<&str> = findings
        .iter()
        .filter(|f| f.severity == Severity::Critical)
        .map(|f| f.category.as_str())
        .collect();
    if !critical_categories.is_empty() {
        return RedTeamResult {
            review_reason: Some(format!("CRITICAL issues found: {}", critical_categories.join(", "))),
            requires_human_review: true,
            overall_confidence: 0.2,
            overall_severity,
            findings,
        };
    }

    let has_high = findings.iter().any(|f| f.severity == Severity::High);
    let findings_summary = findings
        .iter()
        .map(|f| format!("- [{:?}] {}: {}", f.severity, f.category, f.description))
        .collect::<Vec<_>>()
        .join("\n");

    let aggregation = llm
        .complete(CompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "Decide whether these findings warrant human review. Respond as JSON only: \
                              {\"requires_human_review\": bool, \"overall_confidence\": float 0-1, \
                              \"review_reason\": string or null}."
                        .to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("Response under review:\n{response}\n\nFindings:\n{findings_summary}"),
                },
            ],
            model: None,
            temperature: 0.2,
            max_tokens: 512,
        })
        .await;

    match aggregation.ok().and_then(|r| serde_json::from_str::<AggregationVerdict>(&r.content).ok()) {
        Some(verdict) => RedTeamResult {
            requires_human_review: verdict.requires_human_review,
            overall_confidence: verdict.overall_confidence,
            review_reason: verdict.review_reason,
            overall_severity,
            findings,
        },
        None => RedTeamResult {
            requires_human_review: has_high,
            overall_confidence: if has_high { 0.6 } else { 0.8 },
            review_reason: if has_high {
                Some("HIGH severity findings detected (aggregation failed)".to_string())
            } else {
                None
            },
            overall_severity,
            findings,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_puts_critical_highest() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }
}
