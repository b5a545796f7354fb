//! Agent specification: a named, registered capability the planner can
//! assign tasks to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered agent capability.
///
/// Agents are not LLM calls themselves; an `AgentSpec` describes what an
/// agent is for and which system prompt / tool access it gets, while the
/// actual completion goes through the LLM Client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    pub allowed_tools: Vec<String>,
    pub is_enabled: bool,
}

impl AgentSpec {
    pub fn is_usable(&self) -> bool {
        self.is_enabled
    }
}
