//! LLM module - Language Model integrations
//!
//! Provides abstractions for different LLM backends with Ollama as the primary.

pub mod ollama;
pub mod scripted;
pub mod traits;

pub use ollama::OllamaClient;
pub use scripted::{RecordedRequest, ScriptedProvider};
pub use traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};
