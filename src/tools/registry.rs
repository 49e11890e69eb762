//! Tool Registry
//!
//! Information Hiding:
//! - Tool storage and lookup implementation hidden
//! - Registration order preserved for stable model prompts
//! - Enablement filtering applied uniformly to every tool

use super::Tool;
use crate::core::model::ToolDefinition;
use std::sync::Arc;

/// Ordered set of tools available to one agent role
pub struct ToolRegistry<C: Send + Sync + 'static> {
    tools: Vec<Arc<dyn Tool<C>>>,
}

impl<C: Send + Sync + 'static> ToolRegistry<C> {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool; a tool with the same name is replaced in place
    pub fn register(&mut self, tool: Arc<dyn Tool<C>>) {
        let name = tool.metadata().name;
        tracing::info!("Registering tool: {}", name);

        match self.tools.iter().position(|t| t.metadata().name == name) {
            Some(index) => self.tools[index] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Get a tool by name, regardless of enablement
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool<C>>> {
        self.tools
            .iter()
            .find(|t| t.metadata().name == name)
            .cloned()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.metadata().name).collect()
    }

    /// Tools whose predicate currently holds, in registration order
    pub fn enabled(&self, ctx: &C) -> Vec<Arc<dyn Tool<C>>> {
        self.tools
            .iter()
            .filter(|tool| tool.is_enabled(ctx))
            .cloned()
            .collect()
    }

    /// Function definitions for the enabled tools only
    pub fn definitions(&self, ctx: &C) -> Vec<ToolDefinition> {
        self.enabled(ctx)
            .iter()
            .map(|tool| tool.metadata().to_definition())
            .collect()
    }
}

impl<C: Send + Sync + 'static> Default for ToolRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + Sync + 'static> Clone for ToolRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            tools: self.tools.clone(),
        }
    }
}
