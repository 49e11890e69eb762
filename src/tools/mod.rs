//! Tool System - Provides gated, failure-mapped tool execution for agents
//!
//! Information Hiding:
//! - Tool execution details hidden behind trait
//! - Enablement decided per call from the live context
//! - Raw errors mapped to user-safe text at the tool boundary
//! - Registry ordering and filtering hidden from consumers

pub mod executor;
pub mod macros;
pub mod math;
pub mod registry;
pub mod support;
pub mod weather;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use thiserror::Error;

use crate::core::model::ToolDefinition;

/// Tool parameter schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub param_type: String,
    pub description: String,
    pub required: bool,
}

/// Tool metadata - describes what the tool does and how to use it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolMetadata {
    /// Function-calling definition offered to the model
    pub fn to_definition(&self) -> ToolDefinition {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                json!({ "type": param.param_type, "description": param.description }),
            );
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }

        ToolDefinition::function(
            self.name.clone(),
            self.description.clone(),
            json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        )
    }
}

impl fmt::Display for ToolMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

/// Result of a tool execution
///
/// `output` is always safe to show the model and the user; `error` keeps the
/// raw failure for logs and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(user_message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: user_message.into(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    NotFound(String),

    #[error("tool '{0}' is disabled")]
    Disabled(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("timed out after {0} seconds")]
    Timeout(u64),
}

impl ToolError {
    /// Only transient failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, ToolError::Upstream(_) | ToolError::Timeout(_))
    }
}

/// Tool trait - All tools must implement this
///
/// `C` is the session context the tool reads from. Tools never mutate it.
#[async_trait]
pub trait Tool<C: Send + Sync + 'static>: Send + Sync {
    /// Get tool metadata (name, description, parameters)
    fn metadata(&self) -> ToolMetadata;

    /// Whether the tool may be offered/executed against this context.
    /// Must be free of side effects; it is re-evaluated on every call.
    fn is_enabled(&self, _ctx: &C) -> bool {
        true
    }

    /// Validate arguments before execution (optional)
    fn validate(&self, _args: &Value) -> Result<(), ToolError> {
        Ok(())
    }

    async fn execute(&self, args: Value, ctx: &C) -> Result<String, ToolError>;

    /// Map a failure to the message the model and the user will see
    fn on_failure(&self, _error: &ToolError) -> String {
        format!(
            "⚠️ The {} tool is unavailable right now. Please try again later.",
            self.metadata().name
        )
    }
}

/// Deserialize typed arguments, reporting problems as [`ToolError::InvalidArguments`]
pub fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Tool execution configuration
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl From<&crate::config::ToolsConfig> for ToolConfig {
    fn from(config: &crate::config::ToolsConfig) -> Self {
        Self {
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        }
    }
}
