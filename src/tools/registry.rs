//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering tools. Agents never see the registry directly:
//! each loop is handed a [`ToolScope`], an immutable subset resolved once at
//! construction.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::{SubAgent, SubAgentKind};
use crate::core::{
    Config, Result, SwitchboardError, ToolCall, ToolCategory, ToolDefinition, ToolResult,
};
use crate::llm::LLMProvider;
use crate::tools::profile::{ProfileExtractor, ProfileStore};
use crate::tools::wiki::DocumentService;
use crate::tools::{calculator, delegate, profile, wiki};

/// Per-session values handed to every tool invocation
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Id of the user whose session issued the call
    pub user_id: String,
}

impl ToolContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Something a tool call can be dispatched to
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the call. `Err` is reserved for failures the tool could not describe itself.
    async fn invoke(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult>;
}

/// A registered tool: schema, category, and handler
pub struct ToolSpec {
    /// Model-facing name, description and parameter schema
    pub definition: ToolDefinition,
    /// Category used to build scopes
    pub category: ToolCategory,
    handler: Arc<dyn ToolHandler>,
}

impl ToolSpec {
    pub fn new(
        definition: ToolDefinition,
        category: ToolCategory,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            definition,
            category,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Invoke the handler, folding any error into a failed result
    pub async fn invoke(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        match self.handler.invoke(call, ctx).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = self.name(), error = %e, "Tool handler failed");
                ToolResult::failure(self.name(), format!("Error executing {}: {}", self.name(), e))
            }
        }
    }
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name())
            .field("category", &self.category)
            .finish()
    }
}

/// Registry of available tools
#[derive(Debug, Default)]
pub struct ToolRegistry {
    /// Specs in registration order
    specs: Vec<Arc<ToolSpec>>,
    /// Position of each spec by name
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the full registry: calculator and wiki tools, the two sub-agents
    /// over their scopes, then the delegation and profile tools.
    pub fn standard(
        provider: Arc<dyn LLMProvider>,
        documents: Arc<dyn DocumentService>,
        store: Arc<ProfileStore>,
        config: &Config,
    ) -> Result<Self> {
        let mut registry = Self::new();
        calculator::register_tools(&mut registry)?;
        wiki::register_tools(&mut registry, documents, config.wiki.search_limit)?;

        let search = SubAgent::builder(SubAgentKind::Search)
            .provider(provider.clone())
            .model(&config.models.search)
            .scope(registry.scope(ToolCategory::SEARCH))
            .max_rounds(config.agent.max_rounds)
            .temperature(config.agent.sub_agent_temperature)
            .build()?;

        let reason = SubAgent::builder(SubAgentKind::Reason)
            .provider(provider.clone())
            .model(&config.models.reason)
            .scope(registry.scope(ToolCategory::REASONING))
            .max_rounds(config.agent.max_rounds)
            .temperature(config.agent.sub_agent_temperature)
            .build()?;

        delegate::register_tools(&mut registry, Arc::new(search), Arc::new(reason))?;

        let extractor = ProfileExtractor::new(provider, &config.models.extractor);
        profile::register_tools(&mut registry, extractor, store)?;

        tracing::debug!(tools = registry.len(), "Tool registry built");
        Ok(registry)
    }

    /// Register a tool; names must be unique
    pub fn register(&mut self, spec: ToolSpec) -> Result<()> {
        let name = spec.name().to_string();
        if self.index.contains_key(&name) {
            return Err(SwitchboardError::DuplicateTool(name));
        }
        self.index.insert(name, self.specs.len());
        self.specs.push(Arc::new(spec));
        Ok(())
    }

    /// Convenience wrapper around [`register`](Self::register)
    pub fn register_handler(
        &mut self,
        definition: ToolDefinition,
        category: ToolCategory,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<()> {
        self.register(ToolSpec::new(definition, category, handler))
    }

    /// Look up a tool by name
    pub fn resolve(&self, name: &str) -> Result<&ToolSpec> {
        self.index
            .get(name)
            .map(|&i| self.specs[i].as_ref())
            .ok_or_else(|| SwitchboardError::UnknownTool(name.to_string()))
    }

    /// Specs whose category is in `categories`, in registration order
    pub fn list_for(&self, categories: &[ToolCategory]) -> Vec<&ToolSpec> {
        self.specs
            .iter()
            .filter(|spec| categories.contains(&spec.category))
            .map(|spec| spec.as_ref())
            .collect()
    }

    /// Resolve a category subset into an immutable scope
    pub fn scope(&self, categories: &[ToolCategory]) -> ToolScope {
        ToolScope::from_specs(
            self.specs
                .iter()
                .filter(|spec| categories.contains(&spec.category))
                .cloned()
                .collect(),
        )
    }

    /// All tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// The subset of the registry one loop may call
#[derive(Debug, Clone, Default)]
pub struct ToolScope {
    specs: Vec<Arc<ToolSpec>>,
    by_name: HashMap<String, Arc<ToolSpec>>,
}

impl ToolScope {
    fn from_specs(specs: Vec<Arc<ToolSpec>>) -> Self {
        let by_name = specs
            .iter()
            .map(|spec| (spec.name().to_string(), spec.clone()))
            .collect();
        Self { specs, by_name }
    }

    /// Look up a tool in this scope
    pub fn resolve(&self, name: &str) -> Result<Arc<ToolSpec>> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| SwitchboardError::UnknownTool(name.to_string()))
    }

    /// Model-facing schemas for every tool in scope
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.specs.iter().map(|s| s.definition.clone()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
