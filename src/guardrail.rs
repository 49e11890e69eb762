//! Sentiment guardrail
//!
//! Information Hiding:
//! - Classification prompt and output schema hidden
//! - Lenient JSON extraction from model text hidden
//! - Callers see a verdict and whether the tripwire fired
//!
//! A triggered tripwire is a routing signal for the orchestrator, not an
//! error. Only an unusable model reply is an error.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::context::{GuardrailVerdict, SupportContext};
use crate::core::model::{
    complete_within, ChatMessage, ChatModel, JsonSchemaFormat, ModelReply, ModelRequest,
    ResponseFormat,
};
use crate::error::{Result, SupportError};

pub const GUARDRAIL_INSTRUCTIONS: &str = "Classify if the user input is offensive, rude, or \
negative. Return is_negative=True if it should be blocked or escalated.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardrailOutcome {
    Passed(GuardrailVerdict),
    TripwireTriggered(GuardrailVerdict),
}

impl GuardrailOutcome {
    pub fn verdict(&self) -> &GuardrailVerdict {
        match self {
            GuardrailOutcome::Passed(v) | GuardrailOutcome::TripwireTriggered(v) => v,
        }
    }

    pub fn is_tripwire(&self) -> bool {
        matches!(self, GuardrailOutcome::TripwireTriggered(_))
    }
}

pub struct SentimentGuardrail {
    model: Arc<dyn ChatModel>,
    timeout: Duration,
}

impl SentimentGuardrail {
    pub fn new(model: Arc<dyn ChatModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Classify `input` and record the verdict in `ctx`
    pub async fn evaluate(&self, input: &str, ctx: &mut SupportContext) -> Result<GuardrailOutcome> {
        let request = ModelRequest::new(GUARDRAIL_INSTRUCTIONS, vec![ChatMessage::user(input)])
            .with_response_format(verdict_format());

        let raw = match complete_within(self.model.as_ref(), request, self.timeout).await? {
            ModelReply::Text(text) => text,
            ModelReply::ToolCalls(calls) => {
                return Err(SupportError::MalformedGuardrailOutput {
                    message: format!("expected a verdict, got {} tool call(s)", calls.len()),
                })
            }
        };

        let verdict = parse_verdict(&raw)?;
        tracing::info!(
            "[Guardrail] is_negative={} reasoning={}",
            verdict.is_negative,
            verdict.reasoning
        );

        ctx.last_guardrail_verdict = Some(verdict.clone());

        Ok(if verdict.is_negative {
            GuardrailOutcome::TripwireTriggered(verdict)
        } else {
            GuardrailOutcome::Passed(verdict)
        })
    }
}

fn verdict_format() -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: JsonSchemaFormat {
            name: "sentiment_verdict".to_string(),
            description: Some("Whether the input should be escalated, and why".to_string()),
            schema: json!({
                "type": "object",
                "properties": {
                    "is_negative": { "type": "boolean" },
                    "reasoning": { "type": "string" }
                },
                "required": ["is_negative", "reasoning"],
                "additionalProperties": false
            }),
            strict: true,
        },
    }
}

/// Parse the verdict, tolerating prose or code fences around the JSON object
fn parse_verdict(raw: &str) -> Result<GuardrailVerdict> {
    match serde_json::from_str::<GuardrailVerdict>(raw.trim()) {
        Ok(verdict) => Ok(verdict),
        Err(e) => {
            tracing::warn!("Failed to parse guardrail verdict as JSON: {}", e);

            if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
                if start < end {
                    if let Ok(verdict) = serde_json::from_str(&raw[start..=end]) {
                        return Ok(verdict);
                    }
                }
            }

            Err(SupportError::MalformedGuardrailOutput {
                message: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::testing::{call, text, verdict, ScriptedModel};

    fn guardrail(model: Arc<ScriptedModel>) -> SentimentGuardrail {
        SentimentGuardrail::new(model, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_negative_input_trips_the_wire() {
        let model = Arc::new(ScriptedModel::replying(vec![verdict(true, "Abusive language")]));
        let mut ctx = SupportContext::new("CUST-1234");

        let outcome = guardrail(model.clone())
            .evaluate("this service is garbage", &mut ctx)
            .await
            .unwrap();

        assert!(outcome.is_tripwire());
        assert_eq!(outcome.verdict().reasoning, "Abusive language");
        assert_eq!(ctx.last_guardrail_verdict.as_ref(), Some(outcome.verdict()));

        let request = &model.requests()[0];
        assert_eq!(request.instructions, GUARDRAIL_INSTRUCTIONS);
        assert!(request.tools.is_empty());
        assert!(matches!(request.response_format, Some(ResponseFormat::JsonSchema { .. })));
    }

    #[tokio::test]
    async fn test_neutral_input_passes() {
        let model = Arc::new(ScriptedModel::replying(vec![verdict(false, "Polite question")]));
        let mut ctx = SupportContext::new("CUST-1234");

        let outcome = guardrail(model)
            .evaluate("where is my order?", &mut ctx)
            .await
            .unwrap();

        assert!(!outcome.is_tripwire());
        assert!(!ctx.last_guardrail_verdict.unwrap().is_negative);
    }

    #[tokio::test]
    async fn test_verdict_wrapped_in_prose() {
        let model = Arc::new(ScriptedModel::replying(vec![text(
            "```json\n{\"is_negative\": true, \"reasoning\": \"Hostile\"}\n```",
        )]));
        let mut ctx = SupportContext::new("CUST-1234");

        let outcome = guardrail(model).evaluate("ugh", &mut ctx).await.unwrap();
        assert!(outcome.is_tripwire());
    }

    #[tokio::test]
    async fn test_malformed_output_is_remote_failure() {
        let model = Arc::new(ScriptedModel::replying(vec![text("I think it's fine")]));
        let mut ctx = SupportContext::new("CUST-1234");

        let err = guardrail(model).evaluate("hi", &mut ctx).await.unwrap_err();

        assert!(matches!(err, SupportError::MalformedGuardrailOutput { .. }));
        assert!(err.is_remote_failure());
        assert!(ctx.last_guardrail_verdict.is_none());
    }

    #[tokio::test]
    async fn test_tool_call_reply_is_malformed() {
        let model = Arc::new(ScriptedModel::replying(vec![call("faq_lookup", json!({}))]));
        let mut ctx = SupportContext::new("CUST-1234");

        let err = guardrail(model).evaluate("hi", &mut ctx).await.unwrap_err();
        assert!(matches!(err, SupportError::MalformedGuardrailOutput { .. }));
    }
}
