//! Role Runner - drives one agent role to a final answer or a handoff
//!
//! Information Hiding:
//! - Tool-call loop and conversation bookkeeping hidden
//! - Enabled tool set recomputed before every model call
//! - Handoffs surfaced as an exit value, never followed implicitly
//!
//! The loop:
//! 1. Offer the role's currently enabled tools (and handoffs, if allowed)
//! 2. Final text ends the run; a handoff call ends it with a target
//! 3. Tool calls are executed and their user-safe output fed back
//! 4. Repeat until an answer or the turn limit

use std::sync::Arc;
use std::time::Duration;

use super::registry::AgentRegistry;
use super::role::{handoff_tool_name, AgentId};
use crate::config::Settings;
use crate::core::model::{complete_within, ChatMessage, ChatModel, ModelReply, ModelRequest, ToolCall};
use crate::error::{Result, SupportError};
use crate::tools::executor::ToolExecutor;
use crate::tools::{Tool, ToolConfig, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffMode {
    /// Offer the role's handoff targets as tools
    Offer,
    /// Do not offer handoffs; the role must answer itself
    Suppress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleExit {
    Final(String),
    Handoff {
        target: AgentId,
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRecord {
    pub tool: String,
    pub success: bool,
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct RoleRun {
    pub agent: AgentId,
    pub exit: RoleExit,
    pub tool_calls: Vec<ToolCallRecord>,
    pub model_turns: usize,
}

pub struct Runner {
    model: Arc<dyn ChatModel>,
    executor: ToolExecutor,
    max_turns: usize,
    request_timeout: Duration,
}

impl Runner {
    pub fn new(
        model: Arc<dyn ChatModel>,
        executor: ToolExecutor,
        max_turns: usize,
        request_timeout: Duration,
    ) -> Self {
        Self {
            model,
            executor,
            max_turns: max_turns.max(1),
            request_timeout,
        }
    }

    pub fn from_settings(model: Arc<dyn ChatModel>, settings: &Settings) -> Self {
        Self::new(
            model,
            ToolExecutor::new(ToolConfig::from(&settings.tools)),
            settings.agent.max_turns,
            settings.llm.call_budget(),
        )
    }

    /// Run `agent` on `input` until it answers or hands off
    pub async fn run_role<C: Send + Sync + 'static>(
        &self,
        registry: &AgentRegistry<C>,
        agent: &AgentId,
        input: &str,
        ctx: &C,
        mode: HandoffMode,
    ) -> Result<RoleRun> {
        let role = registry.get(agent)?;
        let mut history = vec![ChatMessage::user(input)];
        let mut tool_calls = Vec::new();

        for turn in 0..self.max_turns {
            tracing::debug!("[{}] model turn {}/{}", role.id, turn + 1, self.max_turns);

            let tools = role.tools.enabled(ctx);
            let mut definitions: Vec<_> = tools
                .iter()
                .map(|tool| tool.metadata().to_definition())
                .collect();

            let mut handoff_targets = Vec::new();
            if mode == HandoffMode::Offer {
                for target_id in &role.handoffs {
                    let target = registry.get(target_id)?;
                    definitions.push(target.handoff_definition());
                    handoff_targets.push((handoff_tool_name(target_id), target_id.clone()));
                }
            }

            let request = ModelRequest::new(role.instructions.clone(), history.clone())
                .with_tools(definitions, role.tool_choice);

            let calls = match complete_within(self.model.as_ref(), request, self.request_timeout).await? {
                ModelReply::Text(text) => {
                    tracing::info!("[{}] final answer after {} model turn(s)", role.id, turn + 1);
                    return Ok(RoleRun {
                        agent: role.id.clone(),
                        exit: RoleExit::Final(text),
                        tool_calls,
                        model_turns: turn + 1,
                    });
                }
                ModelReply::ToolCalls(calls) => calls,
            };

            if let Some((call, target)) = find_handoff(&calls, &handoff_targets) {
                let reason = handoff_reason(call);
                tracing::info!("[{}] handing off to {} ({:?})", role.id, target, reason);
                return Ok(RoleRun {
                    agent: role.id.clone(),
                    exit: RoleExit::Handoff {
                        target: target.clone(),
                        reason,
                    },
                    tool_calls,
                    model_turns: turn + 1,
                });
            }

            history.push(ChatMessage::assistant_tool_calls(calls.clone()));

            for call in calls {
                let record = self.dispatch(&tools, &call, ctx).await;
                history.push(ChatMessage::tool(call.id.clone(), record.output.clone()));
                tool_calls.push(record);
            }
        }

        Err(SupportError::MaxTurnsExceeded {
            agent: role.id.clone(),
            max_turns: self.max_turns,
        })
    }

    /// Run a role that is not expected to hand off and return its answer
    pub async fn run_final<C: Send + Sync + 'static>(
        &self,
        registry: &AgentRegistry<C>,
        agent: &AgentId,
        input: &str,
        ctx: &C,
    ) -> Result<String> {
        let run = self
            .run_role(registry, agent, input, ctx, HandoffMode::Suppress)
            .await?;

        match run.exit {
            RoleExit::Final(answer) => Ok(answer),
            RoleExit::Handoff { target, .. } => Err(SupportError::UnhandledHandoff {
                from: run.agent,
                to: target,
            }),
        }
    }

    /// Execute one requested tool call against the offered set
    async fn dispatch<C: Send + Sync + 'static>(
        &self,
        offered: &[Arc<dyn Tool<C>>],
        call: &ToolCall,
        ctx: &C,
    ) -> ToolCallRecord {
        let Some(tool) = offered.iter().find(|t| t.metadata().name == call.name()) else {
            tracing::warn!("Model requested tool '{}' which was not offered", call.name());
            return ToolCallRecord {
                tool: call.name().to_string(),
                success: false,
                output: format!("Tool '{}' is not available.", call.name()),
            };
        };

        let result = match call.arguments() {
            Ok(args) => self.executor.execute(Arc::clone(tool), args, ctx).await,
            Err(e) => {
                let error = ToolError::InvalidArguments(e.to_string());
                tracing::error!("[ERROR] Tool '{}' failed: {}", call.name(), error);
                crate::tools::ToolResult::failure(tool.on_failure(&error), error.to_string())
            }
        };

        ToolCallRecord {
            tool: call.name().to_string(),
            success: result.success,
            output: result.output,
        }
    }
}

fn find_handoff<'a>(
    calls: &'a [ToolCall],
    targets: &'a [(String, AgentId)],
) -> Option<(&'a ToolCall, &'a AgentId)> {
    calls.iter().find_map(|call| {
        targets
            .iter()
            .find(|(name, _)| name == call.name())
            .map(|(_, id)| (call, id))
    })
}

fn handoff_reason(call: &ToolCall) -> Option<String> {
    call.arguments()
        .ok()
        .and_then(|args| args["reason"].as_str().map(str::trim).map(str::to_string))
        .filter(|reason| !reason.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentBuilder;
    use crate::context::SupportContext;
    use crate::core::model::testing::{call, text, ScriptedModel};
    use crate::core::model::ModelError;
    use crate::tools::support::{FaqLookupTool, OrderStatusLookupTool, ORDER_NOT_FOUND_MESSAGE};
    use serde_json::json;

    fn registry(order_enabled: bool) -> AgentRegistry<SupportContext> {
        let mut registry = AgentRegistry::new();
        registry.register(
            AgentBuilder::new("BotAgent")
                .instructions("bot")
                .tool(FaqLookupTool::new())
                .tool(OrderStatusLookupTool::new().enabled_when(move |_| order_enabled))
                .handoff("HumanAgent")
                .build(),
        );
        registry.register(
            AgentBuilder::new("HumanAgent")
                .instructions("human")
                .handoff_description("Escalate to me when the issue requires empathy.")
                .build(),
        );
        registry
    }

    fn runner(model: Arc<ScriptedModel>) -> Runner {
        Runner::new(model, ToolExecutor::default(), 4, Duration::from_secs(5))
    }

    fn bot() -> AgentId {
        AgentId::new("BotAgent")
    }

    #[tokio::test]
    async fn test_tool_call_then_final_answer() {
        let model = Arc::new(ScriptedModel::replying(vec![
            call("order_status_lookup", json!({"order_id": "ORD-1001"})),
            text("Your order has shipped with DHL."),
        ]));
        let ctx = SupportContext::new("CUST-1");

        let run = runner(model.clone())
            .run_role(&registry(true), &bot(), "where is ORD-1001?", &ctx, HandoffMode::Offer)
            .await
            .unwrap();

        assert_eq!(run.exit, RoleExit::Final("Your order has shipped with DHL.".into()));
        assert_eq!(run.model_turns, 2);
        assert_eq!(
            run.tool_calls[0].output,
            "📦 Order ORD-1001: Shipped | ETA: 3-5 days | Carrier: DHL"
        );

        // Tool output is fed back on the second call
        let second = &model.requests()[1];
        let last = second.messages.last().unwrap();
        assert_eq!(last.role, "tool");
        assert_eq!(last.tool_call_id.as_deref(), Some("call_order_status_lookup"));
    }

    #[tokio::test]
    async fn test_unknown_order_feeds_back_fallback_message() {
        let model = Arc::new(ScriptedModel::replying(vec![
            call("order_status_lookup", json!({"order_id": "ORD-4040"})),
            text("Sorry, I could not find that order."),
        ]));
        let ctx = SupportContext::new("CUST-1");

        let run = runner(model.clone())
            .run_role(&registry(true), &bot(), "status of ORD-4040", &ctx, HandoffMode::Offer)
            .await
            .unwrap();

        assert!(!run.tool_calls[0].success);
        assert_eq!(run.tool_calls[0].output, ORDER_NOT_FOUND_MESSAGE);
        let fed_back = model.requests()[1].messages.last().unwrap().content.clone();
        assert_eq!(fed_back.as_deref(), Some(ORDER_NOT_FOUND_MESSAGE));
    }

    #[tokio::test]
    async fn test_disabled_tool_is_not_offered() {
        let model = Arc::new(ScriptedModel::replying(vec![text("hello")]));
        let ctx = SupportContext::new("CUST-1");

        runner(model.clone())
            .run_role(&registry(false), &bot(), "hi", &ctx, HandoffMode::Offer)
            .await
            .unwrap();

        let offered = model.requests()[0]
            .offered_tool_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        assert_eq!(offered, vec!["faq_lookup", "transfer_to_human_agent"]);
    }

    #[tokio::test]
    async fn test_disabled_tool_is_never_executed_when_requested() {
        let model = Arc::new(ScriptedModel::replying(vec![
            call("order_status_lookup", json!({"order_id": "ORD-1001"})),
            text("I can't check orders right now."),
        ]));
        let ctx = SupportContext::new("CUST-1");

        let run = runner(model)
            .run_role(&registry(false), &bot(), "ORD-1001?", &ctx, HandoffMode::Offer)
            .await
            .unwrap();

        assert!(!run.tool_calls[0].success);
        assert!(!run.tool_calls[0].output.contains("Shipped"));
    }

    #[tokio::test]
    async fn test_handoff_exit_carries_reason() {
        let model = Arc::new(ScriptedModel::replying(vec![call(
            "transfer_to_human_agent",
            json!({"reason": "refund dispute needs judgment"}),
        )]));
        let ctx = SupportContext::new("CUST-1");

        let run = runner(model)
            .run_role(&registry(true), &bot(), "I want a refund", &ctx, HandoffMode::Offer)
            .await
            .unwrap();

        assert_eq!(
            run.exit,
            RoleExit::Handoff {
                target: AgentId::new("HumanAgent"),
                reason: Some("refund dispute needs judgment".into()),
            }
        );
    }

    #[tokio::test]
    async fn test_suppressed_handoffs_are_not_offered() {
        let model = Arc::new(ScriptedModel::replying(vec![text("answer")]));
        let ctx = SupportContext::new("CUST-1");

        let answer = runner(model.clone())
            .run_final(&registry(true), &bot(), "hi", &ctx)
            .await
            .unwrap();

        assert_eq!(answer, "answer");
        assert!(!model.requests()[0]
            .offered_tool_names()
            .contains(&"transfer_to_human_agent"));
    }

    #[tokio::test]
    async fn test_turn_limit() {
        let model = Arc::new(ScriptedModel::replying(vec![
            call("faq_lookup", json!({"question": "how are you?"})),
            call("faq_lookup", json!({"question": "how are you?"})),
            call("faq_lookup", json!({"question": "how are you?"})),
            call("faq_lookup", json!({"question": "how are you?"})),
        ]));
        let ctx = SupportContext::new("CUST-1");

        let err = runner(model)
            .run_role(&registry(true), &bot(), "loop", &ctx, HandoffMode::Offer)
            .await
            .unwrap_err();

        assert!(matches!(err, SupportError::MaxTurnsExceeded { max_turns: 4, .. }));
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let model = Arc::new(ScriptedModel::new(vec![Err(ModelError::Status {
            status: 401,
            body: "invalid key".into(),
        })]));
        let ctx = SupportContext::new("CUST-1");

        let err = runner(model)
            .run_role(&registry(true), &bot(), "hi", &ctx, HandoffMode::Offer)
            .await
            .unwrap_err();

        assert!(err.is_remote_failure());
    }
}
