//! Tool Executor with Retry Logic
//!
//! Information Hiding:
//! - Retry strategy implementation hidden
//! - Backoff algorithm hidden
//! - Failure mapping applied here so raw errors never leave the tool layer

use super::{Tool, ToolConfig, ToolError, ToolResult};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};

/// Tool executor with retry and timeout support
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    config: ToolConfig,
}

impl ToolExecutor {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    /// Execute a tool; every outcome is converted into a [`ToolResult`]
    pub async fn execute<C: Send + Sync + 'static>(
        &self,
        tool: Arc<dyn Tool<C>>,
        args: Value,
        ctx: &C,
    ) -> ToolResult {
        let tool_name = tool.metadata().name;
        let max_attempts = self.config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                tracing::warn!(
                    "Retrying tool '{}' (attempt {}/{})",
                    tool_name,
                    attempt + 1,
                    max_attempts
                );

                // Exponential backoff
                let backoff_ms = self.calculate_backoff(attempt);
                sleep(Duration::from_millis(backoff_ms)).await;
            }

            match self.attempt(tool.as_ref(), &tool_name, args.clone(), ctx).await {
                Ok(output) => return ToolResult::success(output),
                Err(e) => {
                    let retryable = e.is_retryable();
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        let error = last_error.unwrap_or_else(|| ToolError::Upstream("no attempt made".into()));
        tracing::error!("[ERROR] Tool '{}' failed: {}", tool_name, error);

        ToolResult::failure(tool.on_failure(&error), error.to_string())
    }

    async fn attempt<C: Send + Sync + 'static>(
        &self,
        tool: &dyn Tool<C>,
        tool_name: &str,
        args: Value,
        ctx: &C,
    ) -> Result<String, ToolError> {
        if !tool.is_enabled(ctx) {
            return Err(ToolError::Disabled(tool_name.to_string()));
        }
        tool.validate(&args)?;

        let limit = Duration::from_secs(self.config.timeout_secs);
        match timeout(limit, tool.execute(args, ctx)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout(self.config.timeout_secs)),
        }
    }

    /// Calculate exponential backoff delay (internal implementation)
    fn calculate_backoff(&self, attempt: u32) -> u64 {
        let base_delay = 100; // 100ms base
        let max_delay = 5000; // 5s max

        let delay = base_delay * 2_u64.pow(attempt);
        delay.min(max_delay)
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new(ToolConfig::default())
    }
}
