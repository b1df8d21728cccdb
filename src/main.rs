//! Switchboard - routing agent over specialist sub-agents
//!
//! Main entry point for the CLI application.

use clap::Parser;
use switchboard::{Config, Orchestrator, Repl};
use tracing_subscriber::EnvFilter;

/// Switchboard - routes questions to a Wikipedia search agent and a calculator agent
#[derive(Parser, Debug)]
#[command(name = "switchboard")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Orchestrator model (routes requests to the specialists)
    #[arg(long, short = 'o')]
    orchestrator: Option<String>,

    /// Model for the Wikipedia search agent
    #[arg(long)]
    search_model: Option<String>,

    /// Model for the calculator reasoning agent
    #[arg(long)]
    reason_model: Option<String>,

    /// User id whose profile is loaded and updated
    #[arg(long, short = 'u')]
    user: Option<String>,

    /// Maximum model rounds per agent run
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("switchboard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(orchestrator) = args.orchestrator {
        config.models.orchestrator = orchestrator;
    }
    if let Some(search) = args.search_model {
        config.models.search = search;
    }
    if let Some(reason) = args.reason_model {
        config.models.reason = reason;
    }
    if let Some(user) = args.user {
        config.profile.default_user_id = user;
    }
    if let Some(max_rounds) = args.max_rounds {
        anyhow::ensure!(max_rounds > 0, "--max-rounds must be at least 1");
        config.agent.max_rounds = max_rounds;
    }
    if args.debug {
        config.agent.debug = true;
    }

    init_logging(config.agent.debug);

    let mut agent = Orchestrator::new(config)?;

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        agent.initialize().await?;
        let answer = agent.try_process(&prompt).await?;
        println!("{}", answer);
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_orchestrator(agent);
    repl.run().await?;

    Ok(())
}
