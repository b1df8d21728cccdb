//! Custom error types for Switchboard
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Switchboard operations
#[derive(Error, Debug)]
pub enum SwitchboardError {
    /// Model provider connection or API errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Document service (Wikipedia) errors
    #[error("Document service error: {0}")]
    Document(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// A tool with this name is already registered
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    /// The requested tool does not exist in the registry or scope
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// An agentic loop ran out of rounds before producing an answer
    #[error("{agent} did not reach an answer within {max_rounds} rounds")]
    LoopBudgetExceeded { agent: String, max_rounds: usize },

    /// The conversation log was driven out of order
    #[error("Conversation error: {0}")]
    Conversation(String),

    /// Profile extraction returned something that could not be parsed
    #[error("Failed to parse user profile info: {message}")]
    Extraction {
        message: String,
        raw_response: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model not available
    #[error("Model '{0}' not available in Ollama. Run: ollama pull {0}")]
    ModelNotFound(String),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Switchboard operations
pub type Result<T> = std::result::Result<T, SwitchboardError>;

impl SwitchboardError {
    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a document service error
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a conversation ordering error
    pub fn conversation(msg: impl Into<String>) -> Self {
        Self::Conversation(msg.into())
    }

    /// Whether the error ends a run with a message worth keeping in session memory
    pub fn is_reportable(&self) -> bool {
        matches!(self, Self::LoopBudgetExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_message() {
        let err = SwitchboardError::LoopBudgetExceeded {
            agent: "orchestrator".to_string(),
            max_rounds: 15,
        };
        assert_eq!(
            err.to_string(),
            "orchestrator did not reach an answer within 15 rounds"
        );
        assert!(err.is_reportable());
        assert!(!SwitchboardError::llm("down").is_reportable());
    }
}
