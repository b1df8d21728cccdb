//! The agentic loop
//!
//! Shared by the orchestrator and both sub-agents: ask the model, run the tools
//! it requests, feed the results back, and stop at the first assistant turn
//! that answers without requesting a tool.

use futures::future::join_all;
use std::sync::Arc;

use crate::agent::conversation::Conversation;
use crate::agent::loop_state::{AgentLoopState, LoopState};
use crate::core::{Result, SwitchboardError, ToolCall, Turn};
use crate::llm::{GenerateOptions, LLMProvider};
use crate::tools::{ToolContext, ToolScope};

/// Answer used when the model returns neither text nor tool calls
pub const EMPTY_RESPONSE_FALLBACK: &str = "I apologize, but I couldn't generate a response.";

/// Result of a run that reached an answer
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// Content of the final assistant turn
    pub answer: String,
    /// Model calls used
    pub rounds: usize,
}

/// A bounded model/tool loop over one scope
#[derive(Clone)]
pub struct AgenticLoop {
    /// Name used in logs and budget errors
    name: String,
    provider: Arc<dyn LLMProvider>,
    model: String,
    scope: ToolScope,
    max_rounds: usize,
    temperature: f32,
}

impl AgenticLoop {
    pub fn new(
        name: impl Into<String>,
        provider: Arc<dyn LLMProvider>,
        model: impl Into<String>,
        scope: ToolScope,
        max_rounds: usize,
        temperature: f32,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            model: model.into(),
            scope,
            max_rounds,
            temperature,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn scope(&self) -> &ToolScope {
        &self.scope
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Drive `conversation` until the model answers.
    ///
    /// The conversation must already hold the prompt. On return, successful or
    /// not, every tool call in it has been answered.
    pub async fn run(&self, conversation: &mut Conversation, ctx: &ToolContext) -> Result<LoopOutcome> {
        let mut state = AgentLoopState::new(self.max_rounds);
        let result = self.drive(conversation, ctx, &mut state).await;
        if result.is_err() {
            state.fail();
        }
        tracing::debug!(
            agent = %self.name,
            state = %state.state(),
            rounds = state.round,
            "Loop finished"
        );
        result
    }

    async fn drive(
        &self,
        conversation: &mut Conversation,
        ctx: &ToolContext,
        state: &mut AgentLoopState,
    ) -> Result<LoopOutcome> {
        let definitions = self.scope.definitions();
        let options = GenerateOptions::with_temperature(self.temperature);

        while state.should_continue() {
            let round = state.next_round();
            tracing::info!(agent = %self.name, round, max_rounds = self.max_rounds, "Calling model");

            let response = {
                let turns = conversation.model_view()?;
                if definitions.is_empty() {
                    self.provider
                        .chat(&self.model, turns, Some(options.clone()))
                        .await?
                } else {
                    self.provider
                        .chat_with_tools(&self.model, turns, &definitions, Some(options.clone()))
                        .await?
                }
            };

            if response.tool_calls.is_empty() {
                let answer = if response.content.trim().is_empty() {
                    tracing::warn!(agent = %self.name, round, "Model returned an empty turn");
                    EMPTY_RESPONSE_FALLBACK.to_string()
                } else {
                    response.content
                };
                conversation.push_assistant(Turn::assistant(answer.clone()))?;
                state.transition(LoopState::Done)?;
                tracing::info!(agent = %self.name, rounds = round, "Answer reached");
                return Ok(LoopOutcome {
                    answer,
                    rounds: round,
                });
            }

            let calls = assign_ids(response.tool_calls, round);
            conversation.push_assistant(Turn::assistant_with_tools(response.content, calls.clone()))?;
            state.transition(LoopState::ExecutingTool)?;

            tracing::info!(
                agent = %self.name,
                round,
                tools = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                "Executing tools"
            );

            let outputs = join_all(calls.iter().map(|call| self.execute(call, ctx))).await;
            for (call, output) in calls.iter().zip(outputs) {
                conversation.push_tool_result(call, output)?;
            }

            state.transition(LoopState::AwaitingModel)?;
        }

        tracing::warn!(agent = %self.name, max_rounds = self.max_rounds, "Round budget exhausted");
        Err(SwitchboardError::LoopBudgetExceeded {
            agent: self.name.clone(),
            max_rounds: self.max_rounds,
        })
    }

    /// Run one call. Unknown tools are answered with the list of tools in scope.
    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> String {
        match self.scope.resolve(&call.name) {
            Ok(spec) => {
                let result = spec.invoke(call, ctx).await;
                tracing::debug!(
                    tool = %call.name,
                    id = %call.id,
                    success = result.success,
                    output = %result.output,
                    "Tool finished"
                );
                result.output
            }
            Err(e) => {
                tracing::warn!(agent = %self.name, tool = %call.name, "Model requested a tool outside its scope");
                format!(
                    "Error: {}. Available tools: {}",
                    e,
                    self.scope.names().join(", ")
                )
            }
        }
    }
}

/// Give every call a unique id, keeping ids the provider supplied
fn assign_ids(calls: Vec<ToolCall>, round: usize) -> Vec<ToolCall> {
    let mut seen: Vec<String> = Vec::with_capacity(calls.len());
    calls
        .into_iter()
        .enumerate()
        .map(|(index, mut call)| {
            if call.id.is_empty() || seen.contains(&call.id) {
                call.id = format!("call_{}_{}", round, index);
            }
            seen.push(call.id.clone());
            call
        })
        .collect()
}

impl std::fmt::Debug for AgenticLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgenticLoop")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("tools", &self.scope.names())
            .field("max_rounds", &self.max_rounds)
            .finish()
    }
}
