//! Deskbot - customer-support bot orchestration over an LLM
//!
//! A sentiment guardrail screens each message. Clean messages go to a
//! tool-using support bot; flagged ones, or ones the bot hands off, go to a
//! human-style agent. The model client is constructed by the caller and
//! injected; nothing here is a global.

pub mod actors;
pub mod agents;
pub mod cli;
pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod guardrail;
pub mod orchestrator;
pub mod tools;
pub mod utils;

pub use actors::SupportSessionHandle;
pub use config::Settings;
pub use context::{GuardrailVerdict, Order, SupportContext};
pub use crate::core::llm::LLMClient;
pub use crate::core::model::{ChatModel, ModelReply, ModelRequest};
pub use error::{Result, SupportError};
pub use guardrail::{GuardrailOutcome, SentimentGuardrail};
pub use orchestrator::{EscalationCause, SupportOrchestrator, TurnOutcome, TurnState};
