//! Scripted provider
//!
//! Replays queued responses instead of calling a model. Every request is
//! recorded so callers can inspect what the loop actually sent.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::core::{Result, SwitchboardError, ToolDefinition, Turn};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse};

/// A request seen by the scripted provider
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Model the caller asked for
    pub model: String,
    /// Turns sent with the request
    pub turns: Vec<Turn>,
    /// Names of the tools offered to the model
    pub tool_names: Vec<String>,
}

#[derive(Default)]
struct Script {
    /// Responses for any model without its own queue
    shared: VecDeque<LLMResponse>,
    /// Responses reserved for one model
    per_model: HashMap<String, VecDeque<LLMResponse>>,
    /// Returned once the relevant queue is empty
    fallback: Option<LLMResponse>,
    requests: Vec<RecordedRequest>,
}

/// Provider that answers from a fixed script
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<Script>,
}

impl ScriptedProvider {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for whichever model asks next
    pub fn respond(self, response: LLMResponse) -> Self {
        self.with_script(|s| s.shared.push_back(response))
    }

    /// Queue a response for one model only
    pub fn respond_for(self, model: impl Into<String>, response: LLMResponse) -> Self {
        let model = model.into();
        self.with_script(|s| s.per_model.entry(model).or_default().push_back(response))
    }

    /// Answer with `response` forever once the queues run dry
    pub fn repeat(self, response: LLMResponse) -> Self {
        self.with_script(|s| s.fallback = Some(response))
    }

    fn with_script(self, f: impl FnOnce(&mut Script)) -> Self {
        if let Ok(mut script) = self.script.lock() {
            f(&mut script);
        }
        self
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script
            .lock()
            .map(|s| s.requests.clone())
            .unwrap_or_default()
    }

    /// Requests made for a given model
    pub fn requests_for(&self, model: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.model == model)
            .collect()
    }

    fn next_response(
        &self,
        model: &str,
        turns: &[Turn],
        tools: &[ToolDefinition],
    ) -> Result<LLMResponse> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| SwitchboardError::llm("scripted provider lock poisoned"))?;

        script.requests.push(RecordedRequest {
            model: model.to_string(),
            turns: turns.to_vec(),
            tool_names: tools.iter().map(|t| t.name().to_string()).collect(),
        });

        let queued = match script.per_model.get_mut(model) {
            Some(queue) => queue.pop_front(),
            None => script.shared.pop_front(),
        };

        let mut response = queued
            .or_else(|| script.fallback.clone())
            .ok_or_else(|| SwitchboardError::llm(format!("script exhausted for model {}", model)))?;

        if response.model.is_empty() {
            response.model = model.to_string();
        }
        Ok(response)
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat(
        &self,
        model: &str,
        turns: &[Turn],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.next_response(model, turns, &[])
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        turns: &[Turn],
        tools: &[ToolDefinition],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.next_response(model, turns, tools)
    }

    async fn is_model_available(&self, _model: &str) -> Result<bool> {
        Ok(true)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let script = self
            .script
            .lock()
            .map_err(|_| SwitchboardError::llm("scripted provider lock poisoned"))?;
        Ok(script.per_model.keys().cloned().collect())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
