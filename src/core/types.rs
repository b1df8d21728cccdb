//! Shared types used across Switchboard modules
//!
//! Contains conversation turns, tool definitions, and common data types.

use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Prompt framing, only ever the first turn of a run
    System,
    /// The user (or, for sub-agents, the delegating agent)
    Human,
    /// Model output
    Assistant,
    /// Output of a tool invocation
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::Human => write!(f, "human"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A single entry in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Role of the turn's author
    pub role: Role,
    /// Text content; empty on an assistant turn that only requests tools
    pub content: String,
    /// Tool calls requested by the assistant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Id of the call this tool-result turn answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Name of the tool that produced this result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_tool: Option<String>,
}

impl Turn {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            source_tool: None,
        }
    }

    /// Create a system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// Create a human turn
    pub fn human(content: impl Into<String>) -> Self {
        Self::with_role(Role::Human, content)
    }

    /// Create an assistant turn with text only
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create an assistant turn requesting tool calls
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::with_role(Role::Assistant, content)
        }
    }

    /// Create a tool-result turn answering `call`
    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call.id.clone()),
            source_tool: Some(call.name.clone()),
            ..Self::with_role(Role::Tool, content)
        }
    }

    /// Whether this is an assistant turn requesting at least one tool
    pub fn requests_tools(&self) -> bool {
        self.role == Role::Assistant && !self.tool_calls.is_empty()
    }
}

/// A tool call made by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Id linking the call to its result; assigned by the loop when the provider has none
    #[serde(default)]
    pub id: String,
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Create a new tool call without an id
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            arguments,
        }
    }

    /// Set the call id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Get a string argument by key
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Get a numeric argument by key, accepting numeric strings
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.arguments.get(key).and_then(value_as_f64)
    }

    /// Get an integer argument by key, accepting numeric strings
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.arguments.get(key)? {
            serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get a list of numbers by key
    pub fn get_f64_list(&self, key: &str) -> Option<Vec<f64>> {
        self.arguments
            .get(key)?
            .as_array()?
            .iter()
            .map(value_as_f64)
            .collect()
    }

    /// Get a list of strings by key; numbers are rendered as strings
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        self.arguments
            .get(key)?
            .as_array()?
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Get an object argument by key
    pub fn get_object(&self, key: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
        self.arguments.get(key)?.as_object().cloned()
    }
}

fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Definition of a tool that can be called by the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (always "function" for now)
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function details
    pub function: FunctionDefinition,
}

/// Function definition within a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// The tool's name
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Result of executing a tool
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output from the tool
    pub output: String,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: output.into(),
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: error.into(),
        }
    }
}

/// Category of tools, used to build scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    /// Add, subtract, multiply, divide
    Arithmetic,
    /// Mean, median, standard deviation, range
    Statistics,
    /// Unit conversions
    Conversion,
    /// Date differences and ages
    Date,
    /// Word counts and reading time
    Text,
    /// Expression evaluation and equation solving
    Symbolic,
    /// Wikipedia lookup
    Search,
    /// Tools that run a whole sub-agent
    Delegation,
    /// User profile extraction
    Profile,
}

impl ToolCategory {
    /// Categories visible to the reasoning agent
    pub const REASONING: &'static [ToolCategory] = &[
        ToolCategory::Arithmetic,
        ToolCategory::Statistics,
        ToolCategory::Conversion,
        ToolCategory::Date,
        ToolCategory::Text,
        ToolCategory::Symbolic,
    ];

    /// Categories visible to the search agent
    pub const SEARCH: &'static [ToolCategory] = &[ToolCategory::Search];

    /// Categories visible to the orchestrator
    pub const ORCHESTRATOR: &'static [ToolCategory] =
        &[ToolCategory::Delegation, ToolCategory::Profile];
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolCategory::Arithmetic => write!(f, "arithmetic"),
            ToolCategory::Statistics => write!(f, "statistics"),
            ToolCategory::Conversion => write!(f, "conversion"),
            ToolCategory::Date => write!(f, "date"),
            ToolCategory::Text => write!(f, "text"),
            ToolCategory::Symbolic => write!(f, "symbolic"),
            ToolCategory::Search => write!(f, "search"),
            ToolCategory::Delegation => write!(f, "delegation"),
            ToolCategory::Profile => write!(f, "profile"),
        }
    }
}
