//! LLM Provider trait for abstracting different backends
//!
//! Enables swapping between Ollama, hosted APIs, and scripted test models.

use async_trait::async_trait;

use crate::core::{Result, ToolCall, ToolDefinition, Turn};

/// Response from an LLM provider
#[derive(Debug, Clone, Default)]
pub struct LLMResponse {
    /// Text content of the response
    pub content: String,
    /// Any tool calls the model wants to make
    pub tool_calls: Vec<ToolCall>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

impl LLMResponse {
    /// A content-only response
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// A response requesting tool calls
    pub fn tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }

    /// Convert into an assistant turn
    pub fn into_turn(self) -> Turn {
        Turn::assistant_with_tools(self.content, self.tool_calls)
    }
}

/// Token usage information
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Options for LLM generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

impl GenerateOptions {
    /// Options with only a temperature set
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }
}

/// Trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a response from turns
    async fn chat(
        &self,
        model: &str,
        turns: &[Turn],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse>;

    /// Generate a response with tool definitions
    async fn chat_with_tools(
        &self,
        model: &str,
        turns: &[Turn],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse>;

    /// Check if a model is available
    async fn is_model_available(&self, model: &str) -> Result<bool>;

    /// List available models
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Get the provider name
    fn name(&self) -> &str;
}
