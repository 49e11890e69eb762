//! Support Orchestrator - one user turn through guardrail, bot and escalation
//!
//! Information Hiding:
//! - Turn state machine hidden behind `handle_turn`
//! - Escalation message format hidden
//! - Role registry and runner owned here, model injected
//!
//! States: Start → GuardrailCheck → {BotTurn | Escalate} → Done,
//! with BotTurn → Escalate when the bot hands off.

use std::sync::Arc;

use crate::agents::support::{bot_agent, human_agent, support_roles};
use crate::agents::{AgentId, AgentRegistry, HandoffMode, RoleExit, Runner, ToolCallRecord};
use crate::config::Settings;
use crate::context::SupportContext;
use crate::core::model::ChatModel;
use crate::error::{Result, SupportError};
use crate::guardrail::{GuardrailOutcome, SentimentGuardrail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Start,
    GuardrailCheck,
    BotTurn,
    Escalate,
    Done,
}

/// Why a turn ended with the human agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscalationCause {
    Guardrail,
    BotHandoff { reason: Option<String> },
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub answer: String,
    pub responder: AgentId,
    pub escalation: Option<EscalationCause>,
    pub trace: Vec<TurnState>,
    pub tool_calls: Vec<ToolCallRecord>,
}

impl TurnOutcome {
    pub fn escalated(&self) -> bool {
        self.escalation.is_some()
    }
}

pub struct SupportOrchestrator {
    guardrail: SentimentGuardrail,
    runner: Runner,
    roles: AgentRegistry<SupportContext>,
    bot: AgentId,
    human: AgentId,
}

impl SupportOrchestrator {
    pub fn new(model: Arc<dyn ChatModel>, settings: &Settings) -> Result<Self> {
        let guardrail = SentimentGuardrail::new(Arc::clone(&model), settings.llm.call_budget());
        let runner = Runner::from_settings(model, settings);
        let roles = support_roles(&settings.tools)?;
        Ok(Self::from_parts(guardrail, runner, roles))
    }

    pub fn from_parts(
        guardrail: SentimentGuardrail,
        runner: Runner,
        roles: AgentRegistry<SupportContext>,
    ) -> Self {
        Self {
            guardrail,
            runner,
            roles,
            bot: bot_agent(),
            human: human_agent(),
        }
    }

    /// Drive one turn; exactly one of the two roles produces the answer
    pub async fn handle_turn(&self, ctx: &mut SupportContext, input: &str) -> Result<TurnOutcome> {
        let mut trace = vec![TurnState::Start, TurnState::GuardrailCheck];
        ctx.last_guardrail_verdict = None;

        let mut tool_calls = Vec::new();
        let cause = match self.guardrail.evaluate(input, ctx).await? {
            GuardrailOutcome::TripwireTriggered(_) => {
                tracing::info!("[LOG] Guardrail triggered → escalating to {}", self.human);
                EscalationCause::Guardrail
            }
            GuardrailOutcome::Passed(_) => {
                trace.push(TurnState::BotTurn);
                let run = self
                    .runner
                    .run_role(&self.roles, &self.bot, input, &*ctx, HandoffMode::Offer)
                    .await?;
                tool_calls = run.tool_calls;

                match run.exit {
                    RoleExit::Final(answer) => {
                        trace.push(TurnState::Done);
                        return Ok(TurnOutcome {
                            answer,
                            responder: run.agent,
                            escalation: None,
                            trace,
                            tool_calls,
                        });
                    }
                    RoleExit::Handoff { target, reason } if target == self.human => {
                        tracing::info!("[LOG] {} handed off → escalating to {}", run.agent, target);
                        EscalationCause::BotHandoff { reason }
                    }
                    RoleExit::Handoff { target, .. } => {
                        return Err(SupportError::UnhandledHandoff {
                            from: run.agent,
                            to: target,
                        })
                    }
                }
            }
        };

        trace.push(TurnState::Escalate);
        let message = compose_escalation(input, &cause, ctx)?;
        let answer = self
            .runner
            .run_final(&self.roles, &self.human, &message, &*ctx)
            .await?;
        trace.push(TurnState::Done);

        Ok(TurnOutcome {
            answer,
            responder: self.human.clone(),
            escalation: Some(cause),
            trace,
            tool_calls,
        })
    }
}

/// The message the human agent receives on escalation
pub fn compose_escalation(
    input: &str,
    cause: &EscalationCause,
    ctx: &SupportContext,
) -> Result<String> {
    match cause {
        EscalationCause::Guardrail => {
            let verdict = ctx
                .last_guardrail_verdict
                .as_ref()
                .ok_or(SupportError::MissingGuardrailVerdict)?;
            Ok(format!(
                "Escalated query: {}\nGuardrail reasoning: {}",
                input, verdict.reasoning
            ))
        }
        EscalationCause::BotHandoff { reason } => Ok(format!(
            "Escalated query: {}\nBot reasoning: {}",
            input,
            reason
                .as_deref()
                .unwrap_or("The support bot could not resolve this query.")
        )),
    }
}
