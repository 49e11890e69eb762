use anyhow::Result;
use clap::Parser;
use deskbot::agents::catalog::catalog_roles;
use deskbot::agents::{Catalog, CatalogAgent, Runner};
use deskbot::cli::{Cli, Commands};
use deskbot::{
    utils, ChatModel, EscalationCause, LLMClient, Settings, SupportContext, SupportOrchestrator,
    SupportSessionHandle, TurnOutcome,
};
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let model: Arc<dyn ChatModel> = Arc::new(LLMClient::new(settings.api_key()?, settings.clone())?);
    tracing::info!("Using model {} at {}", settings.llm.model, settings.llm.base_url);

    match cli.command {
        Commands::Ask { agent, prompt } => handle_ask(model, &settings, agent, prompt).await,
        Commands::Demo { agent } => handle_demo(model, &settings, agent).await,
        Commands::Support {
            customer_id,
            message,
        } => handle_support(model, &settings, customer_id, message).await,
    }
}

fn catalog(model: Arc<dyn ChatModel>, settings: &Settings) -> Catalog {
    let registry = catalog_roles(&settings.weather, settings.weather_api_key());
    Catalog::new(registry, Runner::from_settings(model, settings))
}

async fn handle_ask(
    model: Arc<dyn ChatModel>,
    settings: &Settings,
    agent: CatalogAgent,
    prompt: String,
) -> Result<()> {
    utils::print_info("Sending request...");

    let answer = catalog(model, settings).ask(agent, &prompt).await?;
    println!("\n{}", answer);
    Ok(())
}

async fn handle_demo(model: Arc<dyn ChatModel>, settings: &Settings, agent: CatalogAgent) -> Result<()> {
    utils::print_header(&format!("{} demo", agent.id()));

    let answers = catalog(model, settings).demo(agent).await?;
    for (question, answer) in &answers {
        utils::print_question(question);
        utils::print_answer(answer);
    }
    Ok(())
}

async fn handle_support(
    model: Arc<dyn ChatModel>,
    settings: &Settings,
    customer_id: Option<String>,
    message: Option<String>,
) -> Result<()> {
    let customer_id = customer_id.unwrap_or_else(|| settings.support.customer_id.clone());
    let orchestrator = Arc::new(SupportOrchestrator::new(model, settings)?);
    let session = SupportSessionHandle::new(
        orchestrator,
        SupportContext::new(customer_id.clone()),
        settings.system.channel_buffer_size,
    );

    if let Some(message) = message {
        let result = session.submit(message).await;
        session.shutdown().await?;
        print_outcome(&result?);
        return Ok(());
    }

    utils::print_header("Support Bot");
    utils::print_info(&format!("Customer: {}", customer_id));
    utils::print_info("Type your messages (/quit or Ctrl+C to exit)\n");

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        utils::print_prompt("Enter your message: ");
        let mut input = String::new();
        if reader.read_line(&mut input).await? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" {
            break;
        }

        match session.submit(input).await {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => utils::print_error(&format!("Turn failed: {}", e)),
        }
        println!();
    }

    session.shutdown().await?;
    utils::print_success("Session closed");
    Ok(())
}

fn print_outcome(outcome: &TurnOutcome) {
    match &outcome.escalation {
        Some(EscalationCause::Guardrail) => utils::print_log(&format!(
            "Guardrail triggered → escalating to {}",
            outcome.responder
        )),
        Some(EscalationCause::BotHandoff { reason }) => utils::print_log(&format!(
            "Bot handed off → escalating to {} ({})",
            outcome.responder,
            reason.as_deref().unwrap_or("no reason given")
        )),
        None => {}
    }
    utils::print_response(outcome.responder.as_str(), &outcome.answer);
}
