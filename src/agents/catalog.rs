//! Single-agent assistants runnable from the command line
//!
//! Each one is a role with its own instructions and tools and a set of
//! canned demo questions. They carry no session state.

use std::sync::Arc;

use super::builder::AgentBuilder;
use super::registry::AgentRegistry;
use super::role::AgentId;
use super::runner::Runner;
use crate::config::WeatherConfig;
use crate::error::Result;
use crate::tools::math::{AddTool, MultiplyTool};
use crate::tools::weather::WeatherTool;
use crate::tools::Tool;

const FAQ_INSTRUCTIONS: &str = r#"You are a helpful FAQ bot.

You must always reply with the exact predefined answers below if the user asks one of these questions:

- "what is your name?" → I am FAQBot 🤖, your helpful assistant!
- "what can you do?" → I can answer predefined questions quickly and clearly.
- "how are you?" → I’m just code, but I’m doing great! 🚀
- "who created you?" → I was created by a developer using the OpenAI Agent SDK + Gemini Flash 2.5.
- "what is chainlit?" → Chainlit is a framework to build beautiful UIs for LLM-powered apps.

If the question is not in this list, politely say: "Sorry, I don’t know the answer to that.""#;

const MATH_INSTRUCTIONS: &str = "You are a helpful math assistant. If the user asks a math \
question (like addition or multiplication), use the provided tools to calculate the answer. \
Otherwise, reply normally.";

const WEATHER_INSTRUCTIONS: &str = "You are a weather assistant. If the user asks about the \
weather in a city, use the weather tool to fetch the answer. Otherwise, respond normally.";

const MULTI_TOOL_INSTRUCTIONS: &str = "You are a versatile assistant.\n\
- If the user asks a math question (like addition), use the add tool.\n\
- If the user asks about the weather, use the weather tool.\n\
- Otherwise, answer normally.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CatalogAgent {
    Faq,
    Math,
    Weather,
    MultiTool,
}

impl CatalogAgent {
    pub fn all() -> [CatalogAgent; 4] {
        [Self::Faq, Self::Math, Self::Weather, Self::MultiTool]
    }

    pub fn id(&self) -> AgentId {
        AgentId::new(match self {
            Self::Faq => "faq_agent",
            Self::Math => "math_agent",
            Self::Weather => "weather_agent",
            Self::MultiTool => "multi_tool_agent",
        })
    }

    pub fn demo_questions(&self) -> &'static [&'static str] {
        match self {
            Self::Faq => &["what is your name?"],
            Self::Math => &[
                "What is 5 + 7?",
                "Can you multiply 6 and 9?",
                "If I add 20 and 30, what do I get?",
            ],
            Self::Weather => &[
                "What’s the weather in Karachi?",
                "Tell me the weather in Lahore.",
                "How’s the weather in New York?",
            ],
            Self::MultiTool => &[
                "What is 15 + 27?",
                "What’s the weather in Karachi?",
                "Add 200 and 300.",
                "Tell me the weather in Lahore.",
            ],
        }
    }
}

pub fn catalog_roles(weather: &WeatherConfig, weather_api_key: Option<String>) -> AgentRegistry<()> {
    let weather_tool: Arc<dyn Tool<()>> =
        Arc::new(WeatherTool::from_config(weather, weather_api_key));

    let mut registry = AgentRegistry::new();

    registry.register(
        AgentBuilder::<()>::new(CatalogAgent::Faq.id().as_str())
            .instructions(FAQ_INSTRUCTIONS)
            .build(),
    );
    registry.register(
        AgentBuilder::<()>::new(CatalogAgent::Math.id().as_str())
            .instructions(MATH_INSTRUCTIONS)
            .tool(AddTool)
            .tool(MultiplyTool)
            .build(),
    );
    registry.register(
        AgentBuilder::<()>::new(CatalogAgent::Weather.id().as_str())
            .instructions(WEATHER_INSTRUCTIONS)
            .tool_arc(Arc::clone(&weather_tool))
            .build(),
    );
    registry.register(
        AgentBuilder::<()>::new(CatalogAgent::MultiTool.id().as_str())
            .instructions(MULTI_TOOL_INSTRUCTIONS)
            .tool(AddTool)
            .tool_arc(weather_tool)
            .build(),
    );

    registry
}

/// Runs catalog agents one question at a time
pub struct Catalog {
    registry: AgentRegistry<()>,
    runner: Runner,
}

impl Catalog {
    pub fn new(registry: AgentRegistry<()>, runner: Runner) -> Self {
        Self { registry, runner }
    }

    pub async fn ask(&self, agent: CatalogAgent, prompt: &str) -> Result<String> {
        tracing::info!("[{}] question: {}", agent.id(), prompt);
        self.runner
            .run_final(&self.registry, &agent.id(), prompt, &())
            .await
    }

    /// Ask every canned question; stops at the first failed turn
    pub async fn demo(&self, agent: CatalogAgent) -> Result<Vec<(String, String)>> {
        let mut answers = Vec::new();
        for question in agent.demo_questions() {
            let answer = self.ask(agent, question).await?;
            answers.push((question.to_string(), answer));
        }
        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::testing::{call, text, ScriptedModel};
    use crate::tools::executor::ToolExecutor;
    use serde_json::json;
    use std::time::Duration;

    fn catalog(model: Arc<ScriptedModel>) -> Catalog {
        let runner = Runner::new(model, ToolExecutor::default(), 4, Duration::from_secs(5));
        Catalog::new(catalog_roles(&WeatherConfig::default(), None), runner)
    }

    #[test]
    fn test_every_catalog_agent_is_registered() {
        let registry = catalog_roles(&WeatherConfig::default(), Some("key".into()));
        for agent in CatalogAgent::all() {
            assert!(registry.contains(&agent.id()), "missing {}", agent.id());
            assert!(!agent.demo_questions().is_empty());
        }
        assert_eq!(
            registry.get(&CatalogAgent::MultiTool.id()).unwrap().tools.tool_names(),
            vec!["add", "get_weather"]
        );
    }

    #[tokio::test]
    async fn test_math_agent_uses_tool_result() {
        let model = Arc::new(ScriptedModel::replying(vec![
            call("add", json!({"a": 5, "b": 7})),
            text("5 + 7 = 12"),
        ]));

        let answer = catalog(model.clone())
            .ask(CatalogAgent::Math, "What is 5 + 7?")
            .await
            .unwrap();

        assert_eq!(answer, "5 + 7 = 12");
        let fed_back = model.requests()[1].messages.last().unwrap().content.clone();
        assert_eq!(fed_back.as_deref(), Some("12"));
    }

    #[tokio::test]
    async fn test_weather_tool_hidden_without_api_key() {
        let model = Arc::new(ScriptedModel::replying(vec![text("I can't check the weather.")]));

        catalog(model.clone())
            .ask(CatalogAgent::MultiTool, "Tell me the weather in Lahore.")
            .await
            .unwrap();

        let offered: Vec<String> = model.requests()[0]
            .offered_tool_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(offered, vec!["add"]);
    }

    #[tokio::test]
    async fn test_demo_asks_every_question() {
        let model = Arc::new(ScriptedModel::replying(vec![text(
            "I am FAQBot 🤖, your helpful assistant!",
        )]));

        let answers = catalog(model).demo(CatalogAgent::Faq).await.unwrap();

        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].0, "what is your name?");
    }
}
