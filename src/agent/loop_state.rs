//! Agentic loop state management
//!
//! Tracks where a run is in the model-call / tool-execution cycle and how many
//! rounds it has used.

use std::fmt;

use crate::core::{Result, SwitchboardError};

/// Phase of a loop run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the model's next turn
    AwaitingModel,
    /// Running the tool calls of the last assistant turn
    ExecutingTool,
    /// The model produced a final answer
    Done,
    /// The run ended with an error
    Failed,
}

impl LoopState {
    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, LoopState::Done | LoopState::Failed)
    }

    fn can_become(self, next: LoopState) -> bool {
        use LoopState::*;
        matches!(
            (self, next),
            (AwaitingModel, ExecutingTool)
                | (AwaitingModel, Done)
                | (ExecutingTool, AwaitingModel)
                | (AwaitingModel, Failed)
                | (ExecutingTool, Failed)
        )
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::AwaitingModel => write!(f, "awaiting model"),
            LoopState::ExecutingTool => write!(f, "executing tools"),
            LoopState::Done => write!(f, "done"),
            LoopState::Failed => write!(f, "failed"),
        }
    }
}

/// State of one run plus its round budget
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Model calls made so far
    pub round: usize,
    /// Maximum allowed model calls
    pub max_rounds: usize,
    state: LoopState,
}

impl AgentLoopState {
    /// Create a new loop state with the given round budget
    pub fn new(max_rounds: usize) -> Self {
        Self {
            round: 0,
            max_rounds,
            state: LoopState::AwaitingModel,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Whether another model call is allowed
    pub fn should_continue(&self) -> bool {
        self.state == LoopState::AwaitingModel && self.round < self.max_rounds
    }

    /// Count a model call and return its 1-based round number
    pub fn next_round(&mut self) -> usize {
        self.round += 1;
        self.round
    }

    /// Move to `next`, rejecting transitions the loop never makes
    pub fn transition(&mut self, next: LoopState) -> Result<()> {
        if !self.state.can_become(next) {
            return Err(SwitchboardError::conversation(format!(
                "invalid loop transition: {} -> {}",
                self.state, next
            )));
        }
        tracing::trace!(from = %self.state, to = %next, round = self.round, "Loop transition");
        self.state = next;
        Ok(())
    }

    /// Mark the run failed. Always allowed from a non-terminal state.
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = LoopState::Failed;
        }
    }
}
