//! Agent Builder - Fluent construction of agent roles
//!
//! Information Hiding:
//! - Hides tool registration and Arc wrapping
//! - Supplies default instructions and handoff descriptions
//! - Exposes fluent builder interface

use super::role::{AgentId, AgentRole};
use crate::core::model::ToolChoice;
use crate::tools::registry::ToolRegistry;
use crate::tools::Tool;
use std::sync::Arc;

/// Builder for [`AgentRole`]
///
/// # Example
/// ```
/// use deskbot::agents::AgentBuilder;
/// use deskbot::context::SupportContext;
/// use deskbot::tools::support::FaqLookupTool;
///
/// let role = AgentBuilder::<SupportContext>::new("BotAgent")
///     .instructions("You are a helpful support bot.")
///     .tool(FaqLookupTool::new())
///     .handoff("HumanAgent")
///     .build();
///
/// assert_eq!(role.tools.len(), 1);
/// assert_eq!(role.handoffs.len(), 1);
/// ```
pub struct AgentBuilder<C: Send + Sync + 'static> {
    id: AgentId,
    instructions: Option<String>,
    handoff_description: Option<String>,
    tools: ToolRegistry<C>,
    handoffs: Vec<AgentId>,
    tool_choice: ToolChoice,
}

impl<C: Send + Sync + 'static> AgentBuilder<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AgentId::new(name),
            instructions: None,
            handoff_description: None,
            tools: ToolRegistry::new(),
            handoffs: Vec::new(),
            tool_choice: ToolChoice::Auto,
        }
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Tells other roles when to hand off to this one
    pub fn handoff_description(mut self, description: impl Into<String>) -> Self {
        self.handoff_description = Some(description.into());
        self
    }

    pub fn tool<T: Tool<C> + 'static>(mut self, tool: T) -> Self {
        self.tools.register(Arc::new(tool));
        self
    }

    /// Add a pre-wrapped Arc<dyn Tool>
    pub fn tool_arc(mut self, tool: Arc<dyn Tool<C>>) -> Self {
        self.tools.register(tool);
        self
    }

    /// Allow handing the turn to another role, resolved by id at dispatch time
    pub fn handoff(mut self, target: impl Into<AgentId>) -> Self {
        let target = target.into();
        if !self.handoffs.contains(&target) {
            self.handoffs.push(target);
        }
        self
    }

    pub fn tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = choice;
        self
    }

    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn build(self) -> AgentRole<C> {
        let instructions = self.instructions.unwrap_or_else(|| {
            format!(
                "You are an agent named {}. Use your available tools to help the user.",
                self.id
            )
        });
        let handoff_description = self
            .handoff_description
            .unwrap_or_else(|| format!("Agent {}", self.id));

        AgentRole {
            id: self.id,
            instructions,
            handoff_description,
            tools: self.tools,
            handoffs: self.handoffs,
            tool_choice: self.tool_choice,
        }
    }
}
