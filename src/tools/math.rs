//! Integer arithmetic tools

use super::{parse_args, Tool, ToolError, ToolMetadata};
use crate::tool_metadata;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Operands {
    a: i64,
    b: i64,
}

fn operands_metadata(name: &str, description: &str) -> ToolMetadata {
    tool_metadata! {
        name: name,
        description: description,
        parameters: [
            {
                name: "a",
                type: "integer",
                description: "First operand",
                required: true
            },
            {
                name: "b",
                type: "integer",
                description: "Second operand",
                required: true
            }
        ]
    }
}

/// Return the sum of two numbers
pub struct AddTool;

#[async_trait]
impl<C: Send + Sync + 'static> Tool<C> for AddTool {
    fn metadata(&self) -> ToolMetadata {
        operands_metadata("add", "Return the sum of two numbers.")
    }

    async fn execute(&self, args: Value, _ctx: &C) -> Result<String, ToolError> {
        let Operands { a, b } = parse_args(args)?;
        a.checked_add(b)
            .map(|sum| sum.to_string())
            .ok_or_else(|| ToolError::InvalidArguments(format!("{} + {} overflows", a, b)))
    }

    fn on_failure(&self, _error: &ToolError) -> String {
        "I can only add two whole numbers that fit in 64 bits.".to_string()
    }
}

/// Return the product of two numbers
pub struct MultiplyTool;

#[async_trait]
impl<C: Send + Sync + 'static> Tool<C> for MultiplyTool {
    fn metadata(&self) -> ToolMetadata {
        operands_metadata("multiply", "Return the product of two numbers.")
    }

    async fn execute(&self, args: Value, _ctx: &C) -> Result<String, ToolError> {
        let Operands { a, b } = parse_args(args)?;
        a.checked_mul(b)
            .map(|product| product.to_string())
            .ok_or_else(|| ToolError::InvalidArguments(format!("{} * {} overflows", a, b)))
    }

    fn on_failure(&self, _error: &ToolError) -> String {
        "I can only multiply two whole numbers whose product fits in 64 bits.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_and_multiply() {
        let sum = Tool::<()>::execute(&AddTool, json!({"a": 15, "b": 27}), &()).await;
        assert_eq!(sum.unwrap(), "42");

        let product = Tool::<()>::execute(&MultiplyTool, json!({"a": 6, "b": 9}), &()).await;
        assert_eq!(product.unwrap(), "54");
    }

    #[tokio::test]
    async fn test_overflow_is_rejected() {
        let err = Tool::<()>::execute(&MultiplyTool, json!({"a": i64::MAX, "b": 2}), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_missing_operand() {
        let err = Tool::<()>::execute(&AddTool, json!({"a": 1}), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
