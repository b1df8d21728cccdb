//! Interactive REPL for Switchboard
//!
//! Provides the main user interaction loop.

use std::io::{self, BufRead, Write};

use crate::agent::Orchestrator;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: Orchestrator,
}

impl Repl {
    /// Create a REPL with custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            agent: Orchestrator::new(config)?,
        })
    }

    /// Create a REPL around an existing orchestrator
    pub fn with_orchestrator(agent: Orchestrator) -> Self {
        Self { agent }
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        print!("Initializing...");
        io::stdout().flush()?;

        match self.agent.initialize().await {
            Ok(()) => println!(" Ready!\n"),
            Err(e) => {
                println!("\n\nInitialization Error: {}\n", e);
                return Ok(());
            }
        }

        if let Some(profile) = self.agent.profile().await.and_then(|p| p.summary()) {
            println!("Welcome back. {}\n", profile);
        }

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match handle_command(input, &mut self.agent).await {
                Ok(CommandResult::Exit) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(CommandResult::Clear) => {
                    println!("Conversation cleared.\n");
                    continue;
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                    continue;
                }
                Ok(CommandResult::Continue(input)) => {
                    let response = self.agent.process(&input).await;
                    println!("\nAssistant:\n{}\n", response);
                }
                Err(e) => {
                    eprintln!("Command error: {}\n", e);
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.agent.config();

        println!(
            r#"
╔═══════════════════════════════════════════════╗
║                                               ║
║   SWITCHBOARD                                 ║
║   Orchestrator for search and reason agents   ║
║                                               ║
╚═══════════════════════════════════════════════╝
"#
        );
        println!("Ollama:     {}", config.ollama_url());
        println!("Wikipedia:  {}", config.wiki.api_url);
        println!("Models:");
        println!("  Orchestrator: {}", config.models.orchestrator);
        println!("  Search:       {}", config.models.search);
        println!("  Reason:       {}", config.models.reason);
        println!("User:       {}", self.agent.user_id());
        println!();
        println!("Commands: help, clear, status, profile, exit");
        println!("─────────────────────────────────────────────────");
    }
}
