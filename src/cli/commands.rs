use clap::{Parser, Subcommand};

use crate::agents::CatalogAgent;

#[derive(Parser)]
#[command(name = "deskbot")]
#[command(author, version, about = "Customer-support bot with guardrail escalation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask one of the single-agent assistants a question
    Ask {
        #[arg(short, long, value_enum)]
        agent: CatalogAgent,

        prompt: String,
    },

    /// Run an assistant's canned demo questions
    Demo {
        #[arg(short, long, value_enum)]
        agent: CatalogAgent,
    },

    /// Talk to the support bot (interactive unless --message is given)
    Support {
        /// Customer id for the session (default: support.customer_id)
        #[arg(short, long)]
        customer_id: Option<String>,

        /// Handle a single message and exit
        #[arg(short, long)]
        message: Option<String>,
    },
}
