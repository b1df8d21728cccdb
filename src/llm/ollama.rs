//! Ollama client implementation
//!
//! Async HTTP client for the Ollama chat API with tool calling support.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Config, Result, Role, SwitchboardError, ToolCall, ToolDefinition, Turn};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse, TokenUsage};

/// Ollama API client
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    stream: bool,
}

/// Ollama message format
#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OllamaToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

/// Ollama tool call format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunction,
}

/// Ollama function in tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaFunction {
    name: String,
    arguments: serde_json::Value,
}

/// Ollama generation options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// Ollama chat response (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: OllamaMessage,
    model: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama models list response
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

/// Model information
#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_base_url(config.ollama_url(), config.ollama.timeout_secs)
    }

    /// Create a client with custom base URL
    pub fn with_base_url(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SwitchboardError::llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Convert an internal Turn to Ollama format
    fn to_ollama_message(turn: &Turn) -> OllamaMessage {
        let role = match turn.role {
            Role::System => "system",
            Role::Human => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };

        let tool_calls = if turn.tool_calls.is_empty() {
            None
        } else {
            Some(
                turn.tool_calls
                    .iter()
                    .map(|tc| OllamaToolCall {
                        function: OllamaFunction {
                            name: tc.name.clone(),
                            arguments: tc.arguments.clone(),
                        },
                    })
                    .collect(),
            )
        };

        OllamaMessage {
            role: role.to_string(),
            content: turn.content.clone(),
            tool_calls,
            tool_name: turn.source_tool.clone(),
        }
    }

    /// Convert Ollama response to LLMResponse
    fn to_llm_response(response: ChatResponse) -> LLMResponse {
        let tool_calls = response
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall::new(tc.function.name, tc.function.arguments))
            .collect();

        let usage = match (response.prompt_eval_count, response.eval_count) {
            (Some(prompt), Some(completion)) => Some(TokenUsage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }),
            _ => None,
        };

        LLMResponse {
            content: response.message.content,
            tool_calls,
            usage,
            model: response.model,
        }
    }

    fn connect_error(&self, e: reqwest::Error) -> SwitchboardError {
        if e.is_connect() {
            SwitchboardError::llm(format!(
                "Cannot connect to Ollama at {}. Is it running?",
                self.base_url
            ))
        } else {
            SwitchboardError::from(e)
        }
    }

    /// Send a non-streaming chat request
    async fn send_chat(
        &self,
        model: &str,
        turns: &[Turn],
        tools: Option<&[ToolDefinition]>,
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let request = ChatRequest {
            model,
            messages: turns.iter().map(Self::to_ollama_message).collect(),
            tools: tools.filter(|t| !t.is_empty()),
            options: options.map(|opts| OllamaOptions {
                temperature: opts.temperature,
                num_predict: opts.max_tokens,
                stop: opts.stop,
            }),
            stream: false,
        };

        tracing::debug!(
            model,
            turns = turns.len(),
            tools = tools.map_or(0, |t| t.len()),
            "Sending chat request"
        );

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 && error_text.contains("not found") {
                return Err(SwitchboardError::ModelNotFound(model.to_string()));
            }

            return Err(SwitchboardError::llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response.text().await?;
        tracing::trace!(response = %response_text, "Chat response");

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| SwitchboardError::llm(format!("Failed to parse response: {}", e)))?;

        Ok(Self::to_llm_response(chat_response))
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn chat(
        &self,
        model: &str,
        turns: &[Turn],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.send_chat(model, turns, None, options).await
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        turns: &[Turn],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.send_chat(model, turns, Some(tools), options).await
    }

    async fn is_model_available(&self, model: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models
            .iter()
            .any(|m| m == model || m.split(':').next() == model.split(':').next()))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| self.connect_error(e))?;

        if !response.status().is_success() {
            return Err(SwitchboardError::llm("Failed to list models"));
        }

        let models_response: ModelsResponse = response.json().await?;
        Ok(models_response.models.into_iter().map(|m| m.name).collect())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::with_base_url("http://localhost:11434", 5).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.name(), "ollama");
    }

    #[test]
    fn test_human_turn_maps_to_user_role() {
        let msg = OllamaClient::to_ollama_message(&Turn::human("Hello"));
        assert_eq!(msg.role, "user");
        assert_eq!(msg.content, "Hello");
        assert!(msg.tool_calls.is_none());
    }

    #[test]
    fn test_tool_turns_carry_tool_name() {
        let call = ToolCall::new("add_tool", json!({"numbers": [2, 2]})).with_id("call_0_0");
        let assistant = Turn::assistant_with_tools("", vec![call.clone()]);
        let result = Turn::tool_result(&call, "4");

        let assistant_msg = OllamaClient::to_ollama_message(&assistant);
        let calls = assistant_msg.tool_calls.unwrap();
        assert_eq!(calls[0].function.name, "add_tool");

        let result_msg = OllamaClient::to_ollama_message(&result);
        assert_eq!(result_msg.role, "tool");
        assert_eq!(result_msg.tool_name.as_deref(), Some("add_tool"));
    }

    #[test]
    fn test_response_conversion() {
        let raw = json!({
            "model": "qwen3:8b",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{"function": {"name": "call_reason_agent", "arguments": {"query": "2+2"}}}]
            },
            "prompt_eval_count": 10,
            "eval_count": 5
        });
        let parsed: ChatResponse = serde_json::from_value(raw).unwrap();
        let response = OllamaClient::to_llm_response(parsed);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "call_reason_agent");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }
}
