//! Agent Roles
//!
//! Information Hiding:
//! - Handoff targets kept as ids, resolved through the registry
//! - Handoff tool naming and its `reason` parameter hidden behind handoff_definition
//! - Instructions, tools and tool choice owned by the role

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use crate::core::model::{ToolChoice, ToolDefinition};
use crate::tools::registry::ToolRegistry;

/// Stable identifier of an agent role; handoffs refer to roles by id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One agent role: policy text, the tools it may call, the roles it may hand off to
pub struct AgentRole<C: Send + Sync + 'static> {
    pub id: AgentId,
    pub instructions: String,
    /// Shown to other roles when they consider handing off to this one
    pub handoff_description: String,
    pub tools: ToolRegistry<C>,
    pub handoffs: Vec<AgentId>,
    pub tool_choice: ToolChoice,
}

impl<C: Send + Sync + 'static> AgentRole<C> {
    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    pub fn can_hand_off_to(&self, target: &AgentId) -> bool {
        self.handoffs.contains(target)
    }

    /// The function tool other roles call to transfer the turn to this role
    pub fn handoff_definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            handoff_tool_name(&self.id),
            format!("Handoff to the {} agent. {}", self.id, self.handoff_description),
            json!({
                "type": "object",
                "properties": {
                    "reason": {
                        "type": "string",
                        "description": "Why the conversation is being handed off"
                    }
                },
                "required": []
            }),
        )
    }
}

impl<C: Send + Sync + 'static> fmt::Debug for AgentRole<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRole")
            .field("id", &self.id)
            .field("tools", &self.tools.tool_names())
            .field("handoffs", &self.handoffs)
            .field("tool_choice", &self.tool_choice)
            .finish()
    }
}

/// `HumanAgent` -> `transfer_to_human_agent`
pub fn handoff_tool_name(target: &AgentId) -> String {
    format!("transfer_to_{}", to_snake_case(target.as_str()))
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if ch.is_ascii_uppercase() && prev_lower_or_digit {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower_or_digit = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        } else {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            prev_lower_or_digit = false;
        }
    }

    out.trim_end_matches('_').to_string()
}
