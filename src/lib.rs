//! Switchboard - routing agent over specialist sub-agents
//!
//! An orchestrator model routes each request to a Wikipedia search agent or a
//! calculator reasoning agent, possibly over several rounds, and answers with
//! the first turn that calls no tool. Local models are served by Ollama.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Provider abstraction with Ollama and scripted implementations
//! - **Tools**: Tool registry, calculator, Wikipedia, delegation and profile tools
//! - **Agent**: The agentic loop, sub-agents, orchestrator and session memory
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use switchboard::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> switchboard::Result<()> {
//!     let mut agent = Orchestrator::new(Config::load())?;
//!     agent.initialize().await?;
//!
//!     let answer = agent.process("Convert 100 miles to kilometers").await;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::Orchestrator;
pub use cli::Repl;
pub use core::{Config, Result, SwitchboardError};
