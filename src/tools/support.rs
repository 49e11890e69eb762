//! Customer-support lookup tools
//!
//! Both tools read from [`SupportContext`]; neither mutates it.

use super::{parse_args, Tool, ToolError, ToolMetadata};
use crate::context::SupportContext;
use crate::tool_metadata;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub const FAQ_MISS_MESSAGE: &str = "❓ Sorry, I don’t know that one.";
pub const ORDER_NOT_FOUND_MESSAGE: &str = "⚠️ Order not found. Please double-check your order ID.";

type EnablePredicate = Arc<dyn Fn(&SupportContext) -> bool + Send + Sync>;

fn always() -> EnablePredicate {
    Arc::new(|_| true)
}

/// Case-insensitive FAQ lookup. A miss is an ordinary answer, not an error.
pub fn faq_lookup(question: &str, ctx: &SupportContext) -> String {
    ctx.faq_answer(question)
        .unwrap_or(FAQ_MISS_MESSAGE)
        .to_string()
}

pub fn order_status_lookup(order_id: &str, ctx: &SupportContext) -> Result<String, ToolError> {
    let order_id = order_id.trim();
    let order = ctx
        .order(order_id)
        .ok_or_else(|| ToolError::NotFound("Order not found".to_string()))?;

    Ok(format!("📦 Order {}: {}", order_id, order))
}

#[derive(Debug, Deserialize)]
struct FaqArgs {
    question: String,
}

#[derive(Debug, Deserialize)]
struct OrderArgs {
    #[serde(alias = "orderId")]
    order_id: String,
}

#[derive(Clone)]
pub struct FaqLookupTool {
    enabled: EnablePredicate,
}

impl FaqLookupTool {
    pub fn new() -> Self {
        Self { enabled: always() }
    }

    pub fn enabled_when(
        mut self,
        predicate: impl Fn(&SupportContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.enabled = Arc::new(predicate);
        self
    }
}

impl Default for FaqLookupTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool<SupportContext> for FaqLookupTool {
    fn metadata(&self) -> ToolMetadata {
        tool_metadata! {
            name: "faq_lookup",
            description: "Answer a frequently asked question about the assistant from the FAQ table.",
            parameters: [
                {
                    name: "question",
                    type: "string",
                    description: "The customer's question, as asked",
                    required: true
                }
            ]
        }
    }

    fn is_enabled(&self, ctx: &SupportContext) -> bool {
        (self.enabled)(ctx)
    }

    async fn execute(&self, args: Value, ctx: &SupportContext) -> Result<String, ToolError> {
        let args: FaqArgs = parse_args(args)?;
        Ok(faq_lookup(&args.question, ctx))
    }
}

#[derive(Clone)]
pub struct OrderStatusLookupTool {
    enabled: EnablePredicate,
}

impl OrderStatusLookupTool {
    pub fn new() -> Self {
        Self { enabled: always() }
    }

    pub fn enabled_when(
        mut self,
        predicate: impl Fn(&SupportContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.enabled = Arc::new(predicate);
        self
    }
}

impl Default for OrderStatusLookupTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool<SupportContext> for OrderStatusLookupTool {
    fn metadata(&self) -> ToolMetadata {
        tool_metadata! {
            name: "order_status_lookup",
            description: "Fetch the status, ETA and carrier of a customer order.",
            parameters: [
                {
                    name: "order_id",
                    type: "string",
                    description: "Order identifier such as ORD-1001",
                    required: true
                }
            ]
        }
    }

    fn is_enabled(&self, ctx: &SupportContext) -> bool {
        (self.enabled)(ctx)
    }

    async fn execute(&self, args: Value, ctx: &SupportContext) -> Result<String, ToolError> {
        let args: OrderArgs = parse_args(args)?;
        order_status_lookup(&args.order_id, ctx)
    }

    /// Every failure, including malformed arguments, reads the same to the customer
    fn on_failure(&self, _error: &ToolError) -> String {
        ORDER_NOT_FOUND_MESSAGE.to_string()
    }
}
