//! Turn-level error types
//!
//! A guardrail tripwire is not an error: it is returned as
//! [`GuardrailOutcome::TripwireTriggered`](crate::guardrail::GuardrailOutcome)
//! and routed by the orchestrator. Tool failures never reach this type either;
//! they are mapped to user-facing text at the tool boundary.

use crate::agents::AgentId;
use crate::core::model::ModelError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SupportError>;

#[derive(Debug, Error)]
pub enum SupportError {
    /// The model call itself failed (transport, auth, bad response)
    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("model call timed out after {timeout_ms}ms")]
    ModelTimeout { timeout_ms: u64 },

    #[error("guardrail returned malformed output: {message}")]
    MalformedGuardrailOutput { message: String },

    #[error("escalation requested but no guardrail verdict was recorded for this turn")]
    MissingGuardrailVerdict,

    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error("agent {agent} exceeded {max_turns} model turns without a final answer")]
    MaxTurnsExceeded { agent: AgentId, max_turns: usize },

    #[error("agent {from} handed off to {to}, but this run does not follow handoffs")]
    UnhandledHandoff { from: AgentId, to: AgentId },

    #[error("support session is closed")]
    SessionClosed,
}

impl SupportError {
    /// True for failures of the remote model boundary
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            SupportError::Model(_)
                | SupportError::ModelTimeout { .. }
                | SupportError::MalformedGuardrailOutput { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SupportError::ModelTimeout { timeout_ms: 250 };
        assert_eq!(err.to_string(), "model call timed out after 250ms");

        let err = SupportError::MaxTurnsExceeded {
            agent: AgentId::new("BotAgent"),
            max_turns: 4,
        };
        assert_eq!(
            err.to_string(),
            "agent BotAgent exceeded 4 model turns without a final answer"
        );
    }

    #[test]
    fn test_remote_failure_classification() {
        assert!(SupportError::Model(ModelError::EmptyResponse).is_remote_failure());
        assert!(SupportError::MalformedGuardrailOutput {
            message: "not json".into()
        }
        .is_remote_failure());
        assert!(!SupportError::MissingGuardrailVerdict.is_remote_failure());
        assert!(!SupportError::SessionClosed.is_remote_failure());
    }
}
