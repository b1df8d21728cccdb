//! Delegation tools
//!
//! `call_search_agent` and `call_reason_agent` run a whole sub-agent loop and
//! hand its final answer back to the orchestrator.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::agent::{SubAgent, SubAgentKind};
use crate::core::{Result, SwitchboardError, ToolCall, ToolCategory, ToolDefinition, ToolResult};
use crate::tools::registry::{ToolContext, ToolHandler, ToolRegistry, ToolSpec};

/// A sub-agent exposed as a tool
pub struct DelegateTool {
    agent: Arc<SubAgent>,
}

impl DelegateTool {
    pub fn new(agent: Arc<SubAgent>) -> Self {
        Self { agent }
    }

    pub fn definition(kind: SubAgentKind) -> ToolDefinition {
        ToolDefinition::function(
            kind.tool_name(),
            kind.tool_description(),
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "A self-contained question for the agent"
                    },
                    "context": {
                        "type": "object",
                        "description": "Optional additional context for the agent"
                    }
                },
                "required": ["query"]
            }),
        )
    }
}

#[async_trait]
impl ToolHandler for DelegateTool {
    async fn invoke(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult> {
        let kind = self.agent.kind();
        let query = call
            .get_string("query")
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| SwitchboardError::tool("Missing argument 'query'"))?;
        let context = match call.arguments.get("context") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::String(s)) if !s.trim().is_empty() => {
                let mut map = Map::new();
                map.insert("note".to_string(), Value::String(s.clone()));
                map
            }
            _ => Map::new(),
        };

        tracing::info!(agent = %kind, %query, "Delegating to sub-agent");

        match self.agent.run(&query, &context, ctx).await {
            Ok(answer) => {
                tracing::debug!(agent = %kind, %answer, "Sub-agent answered");
                Ok(ToolResult::success(kind.tool_name(), answer))
            }
            Err(e) => {
                tracing::warn!(agent = %kind, error = %e, "Sub-agent failed");
                Ok(ToolResult::failure(
                    kind.tool_name(),
                    format!("Error running {} agent: {}", kind, e),
                ))
            }
        }
    }
}

/// Register the two delegation tools
pub fn register_tools(
    registry: &mut ToolRegistry,
    search: Arc<SubAgent>,
    reason: Arc<SubAgent>,
) -> Result<()> {
    for agent in [search, reason] {
        let definition = DelegateTool::definition(agent.kind());
        registry.register(ToolSpec::new(
            definition,
            ToolCategory::Delegation,
            Arc::new(DelegateTool::new(agent)),
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LLMResponse, ScriptedProvider};

    fn agent(provider: Arc<ScriptedProvider>, kind: SubAgentKind) -> Arc<SubAgent> {
        Arc::new(
            SubAgent::builder(kind)
                .provider(provider)
                .model("sub")
                .max_rounds(2)
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_answer_crosses_boundary() {
        let provider = Arc::new(ScriptedProvider::new().respond(LLMResponse::text("Paris")));
        let tool = DelegateTool::new(agent(provider.clone(), SubAgentKind::Search));

        let result = tool
            .invoke(
                &ToolCall::new("call_search_agent", json!({"query": "Capital of France?"})),
                &ToolContext::new("u"),
            )
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "Paris");

        let request = &provider.requests()[0];
        assert!(request.turns.iter().any(|t| t.content.contains("Capital of France?")));
    }

    #[tokio::test]
    async fn test_sub_agent_failure_is_reported_as_text() {
        let provider = Arc::new(ScriptedProvider::new());
        let tool = DelegateTool::new(agent(provider, SubAgentKind::Reason));

        let result = tool
            .invoke(
                &ToolCall::new("call_reason_agent", json!({"query": "2+2"})),
                &ToolContext::new("u"),
            )
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.starts_with("Error running reason agent:"));
    }

    #[test]
    fn test_registers_both_tools() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut registry = ToolRegistry::new();
        register_tools(
            &mut registry,
            agent(provider.clone(), SubAgentKind::Search),
            agent(provider, SubAgentKind::Reason),
        )
        .unwrap();
        assert_eq!(registry.names(), vec!["call_search_agent", "call_reason_agent"]);
    }
}
