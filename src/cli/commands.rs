//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use crate::agent::Orchestrator;
use crate::core::Result;

/// Result of parsing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Exit the REPL
    Exit,
    /// Clear history
    Clear,
}

/// Parse and handle special commands
pub async fn handle_command(input: &str, agent: &mut Orchestrator) -> Result<CommandResult> {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].trim_start_matches('/').to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "clear" | "reset" => {
            agent.clear_history();
            Ok(CommandResult::Clear)
        }

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "models" => {
            let models = agent.list_models().await?;
            let output = format!(
                "Available models:\n{}",
                models
                    .iter()
                    .map(|m| format!("  - {}", m))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
            Ok(CommandResult::Handled(output))
        }

        "set" => handle_set_command(args, agent),

        "status" => Ok(CommandResult::Handled(status_text(agent))),

        "save" => {
            let path = agent.save_config()?;
            Ok(CommandResult::Handled(format!(
                "Configuration saved to {}",
                path.display()
            )))
        }

        "profile" => {
            let output = match agent.profile().await {
                Some(profile) => format!(
                    "Profile for {}:\n{}",
                    agent.user_id(),
                    serde_json::to_string_pretty(&profile)?
                ),
                None => format!("No profile stored for {} yet.", agent.user_id()),
            };
            Ok(CommandResult::Handled(output))
        }

        "debug" => {
            let new_state = !agent.config().agent.debug;
            agent.set_debug(new_state);
            Ok(CommandResult::Handled(format!(
                "Debug mode: {}",
                if new_state { "ON" } else { "OFF" }
            )))
        }

        _ => {
            // Not a command, treat as normal input
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

fn status_text(agent: &Orchestrator) -> String {
    let config = agent.config();
    format!(
        "Switchboard Status:\n\
         ─────────────────────────────\n\
         Orchestrator: {}\n\
         Search agent: {}\n\
         Reason agent: {}\n\
         Extractor:    {}\n\
         Max rounds:   {}\n\
         Last request: {}\n\
         Tools:        {} ({} registered)\n\
         User:         {}\n\
         Memory:       {}/{} turns\n\
         Debug:        {}",
        config.models.orchestrator,
        config.models.search,
        config.models.reason,
        config.models.extractor,
        config.agent.max_rounds,
        agent
            .last_rounds()
            .map(|r| format!("{} rounds", r))
            .unwrap_or_else(|| "-".to_string()),
        agent.tool_names().join(", "),
        agent.tool_count(),
        agent.user_id(),
        agent.memory_len(),
        config.agent.history_cap,
        if config.agent.debug { "on" } else { "off" }
    )
}

/// Handle 'set' subcommands
fn handle_set_command(args: &str, agent: &mut Orchestrator) -> Result<CommandResult> {
    let parts: Vec<&str> = args.splitn(2, ' ').collect();

    if parts.is_empty() || parts[0].is_empty() {
        return Ok(CommandResult::Handled(
            "Usage: set <orchestrator|search|reason|rounds|user> <value>\n\
             Examples:\n\
               set orchestrator qwen3:8b\n\
               set reason llama3.1:8b\n\
               set rounds 10"
                .to_string(),
        ));
    }

    let key = parts[0].to_lowercase();
    let value = parts.get(1).map(|s| s.trim()).unwrap_or("");

    if value.is_empty() {
        let config = agent.config();
        let current = match key.as_str() {
            "orchestrator" | "orch" => config.models.orchestrator.clone(),
            "search" => config.models.search.clone(),
            "reason" => config.models.reason.clone(),
            "rounds" => config.agent.max_rounds.to_string(),
            "user" => agent.user_id().to_string(),
            _ => return Ok(unknown_setting(&key)),
        };
        return Ok(CommandResult::Handled(format!("Current {}: {}", key, current)));
    }

    let message = match key.as_str() {
        "orchestrator" | "orch" => {
            agent.set_orchestrator_model(value);
            format!("Orchestrator model set to: {}", value)
        }
        "search" => {
            agent.set_search_model(value)?;
            format!("Search agent model set to: {}", value)
        }
        "reason" => {
            agent.set_reason_model(value)?;
            format!("Reason agent model set to: {}", value)
        }
        "rounds" => match value.parse::<usize>() {
            Ok(rounds) => {
                agent.set_max_rounds(rounds)?;
                format!("Max rounds set to: {}", rounds)
            }
            Err(_) => format!("Not a number: {}", value),
        },
        "user" => {
            agent.set_user(value);
            format!("Switched to user: {} (conversation cleared)", value)
        }
        _ => return Ok(unknown_setting(&key)),
    };

    Ok(CommandResult::Handled(message))
}

fn unknown_setting(key: &str) -> CommandResult {
    CommandResult::Handled(format!(
        "Unknown setting: {}. Available: orchestrator, search, reason, rounds, user",
        key
    ))
}

/// Generate help text
fn help_text() -> String {
    r#"Switchboard Commands:
─────────────────────────────────────────────
  help, ?          Show this help message
  exit, quit, q    Exit Switchboard
  clear, reset     Clear conversation history
  status           Show current configuration
  profile          Show the stored profile of the current user
  models           List available Ollama models
  save             Save the current settings to the config file
  debug            Toggle debug mode

  set orchestrator <model>   Set the orchestrator model
  set search <model>         Set the search agent model
  set reason <model>         Set the reason agent model
  set rounds <n>             Set the round budget of every agent
  set user <id>              Switch to another user's profile

Tips:
  - Factual questions go to the Wikipedia search agent
  - Calculations, conversions and dates go to the reason agent
  - Tell it about yourself and it will remember across sessions
─────────────────────────────────────────────"#
        .to_string()
}
