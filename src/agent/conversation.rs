//! Per-run conversation log
//!
//! Append-only record of one loop run. Every tool call an assistant turn
//! requests must be answered by exactly one tool-result turn before the model
//! is asked again.

use crate::core::{Result, Role, SwitchboardError, ToolCall, Turn};

/// Ordered turns of a single run
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
    /// Ids of calls still waiting for a result, in request order
    pending: Vec<String>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the system prompt; only allowed as the first turn
    pub fn push_system(&mut self, content: impl Into<String>) -> Result<()> {
        if !self.turns.is_empty() {
            return Err(SwitchboardError::conversation(
                "system prompt must be the first turn",
            ));
        }
        self.turns.push(Turn::system(content));
        Ok(())
    }

    /// Add a human message
    pub fn push_human(&mut self, content: impl Into<String>) -> Result<()> {
        self.ensure_settled("human turn")?;
        self.turns.push(Turn::human(content));
        Ok(())
    }

    /// Add an assistant turn. Its tool calls become pending and must carry
    /// unique, non-empty ids.
    pub fn push_assistant(&mut self, turn: Turn) -> Result<()> {
        if turn.role != Role::Assistant {
            return Err(SwitchboardError::conversation(format!(
                "expected an assistant turn, got {}",
                turn.role
            )));
        }
        self.ensure_settled("assistant turn")?;

        let mut ids: Vec<String> = Vec::with_capacity(turn.tool_calls.len());
        for call in &turn.tool_calls {
            if call.id.is_empty() || ids.contains(&call.id) {
                return Err(SwitchboardError::conversation(format!(
                    "tool call '{}' needs a unique id",
                    call.name
                )));
            }
            ids.push(call.id.clone());
        }

        self.pending = ids;
        self.turns.push(turn);
        Ok(())
    }

    /// Answer a pending tool call
    pub fn push_tool_result(&mut self, call: &ToolCall, content: impl Into<String>) -> Result<()> {
        let position = self
            .pending
            .iter()
            .position(|id| *id == call.id)
            .ok_or_else(|| {
                SwitchboardError::conversation(format!(
                    "no pending tool call with id '{}'",
                    call.id
                ))
            })?;
        self.pending.remove(position);
        self.turns.push(Turn::tool_result(call, content));
        Ok(())
    }

    /// The turns to send to the model. Fails while tool calls are unanswered.
    pub fn model_view(&self) -> Result<&[Turn]> {
        self.ensure_settled("model request")?;
        Ok(&self.turns)
    }

    fn ensure_settled(&self, what: &str) -> Result<()> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(SwitchboardError::conversation(format!(
                "{} while tool calls are unanswered: {}",
                what,
                self.pending.join(", ")
            )))
        }
    }

    /// Ids of calls still waiting for results
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Every turn so far
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of tool calls requested by assistant turns
    pub fn tool_call_count(&self) -> usize {
        self.turns.iter().map(|t| t.tool_calls.len()).sum()
    }

    /// Number of tool-result turns
    pub fn tool_result_count(&self) -> usize {
        self.turns.iter().filter(|t| t.role == Role::Tool).count()
    }

    /// The last assistant turn, if any
    pub fn last_assistant(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.role == Role::Assistant)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
