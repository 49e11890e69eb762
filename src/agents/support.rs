//! Customer-support roles
//!
//! BotAgent answers with the lookup tools; HumanAgent handles escalations.
//! Each lists the other as a handoff target.

use super::builder::AgentBuilder;
use super::registry::AgentRegistry;
use super::role::AgentId;
use crate::config::ToolsConfig;
use crate::context::SupportContext;
use crate::core::model::ToolChoice;
use crate::error::Result;
use crate::tools::support::{FaqLookupTool, OrderStatusLookupTool};

pub const BOT_AGENT: &str = "BotAgent";
pub const HUMAN_AGENT: &str = "HumanAgent";

const BOT_INSTRUCTIONS: &str = "You are a helpful support bot. Use faq_lookup for FAQs and \
order_status_lookup for order questions. If you can't find the order_id, answer politely. \
Escalate to the HumanAgent if the query is too complex or requires empathy.";

const BOT_HANDOFF_DESCRIPTION: &str = "Escalate to me when the query is structured, factual, \
or needs tool usage (FAQ/order lookup).";

const HUMAN_INSTRUCTIONS: &str = "You are a human support agent. Be empathetic and resolve \
complex issues. You may receive context from the guardrail (negative sentiment \
classification). Use this information to adapt your tone and response.";

const HUMAN_HANDOFF_DESCRIPTION: &str = "Escalate to me when the issue requires empathy, \
judgment, or cannot be solved by tools.";

pub fn bot_agent() -> AgentId {
    AgentId::new(BOT_AGENT)
}

pub fn human_agent() -> AgentId {
    AgentId::new(HUMAN_AGENT)
}

/// Build the two support roles and wire the handoffs both ways
pub fn support_roles(tools: &ToolsConfig) -> Result<AgentRegistry<SupportContext>> {
    let faq_enabled = tools.faq_enabled;
    let order_status_enabled = tools.order_status_enabled;

    let mut registry = AgentRegistry::new();

    let human = registry.register(
        AgentBuilder::new(HUMAN_AGENT)
            .instructions(HUMAN_INSTRUCTIONS)
            .handoff_description(HUMAN_HANDOFF_DESCRIPTION)
            .build(),
    );

    let bot = registry.register(
        AgentBuilder::new(BOT_AGENT)
            .instructions(BOT_INSTRUCTIONS)
            .handoff_description(BOT_HANDOFF_DESCRIPTION)
            .tool(FaqLookupTool::new().enabled_when(move |_| faq_enabled))
            .tool(OrderStatusLookupTool::new().enabled_when(move |_| order_status_enabled))
            .tool_choice(ToolChoice::Auto)
            .handoff(HUMAN_AGENT)
            .build(),
    );

    registry.link(&human, &bot)?;
    registry.validate()?;

    tracing::info!("Support roles ready: {:?}", registry.ids());
    Ok(registry)
}
