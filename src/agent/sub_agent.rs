//! Specialist sub-agents
//!
//! The search and reason agents are agentic loops over a restricted scope.
//! Each is built once and shared; every run starts from a fresh conversation,
//! so nothing but the final answer leaves the agent.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::agent::conversation::Conversation;
use crate::agent::runner::AgenticLoop;
use crate::core::{Result, SwitchboardError, ToolCategory};
use crate::llm::LLMProvider;
use crate::tools::{ToolContext, ToolScope};

/// Which specialist an agent is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubAgentKind {
    /// Wikipedia research
    Search,
    /// Calculations, conversions, dates and text statistics
    Reason,
}

impl SubAgentKind {
    /// Name of the delegation tool that runs this agent
    pub fn tool_name(self) -> &'static str {
        match self {
            SubAgentKind::Search => "call_search_agent",
            SubAgentKind::Reason => "call_reason_agent",
        }
    }

    pub fn tool_description(self) -> &'static str {
        match self {
            SubAgentKind::Search => {
                "Invokes the search agent to find information, search Wikipedia, or look up facts. \
                 Use this for questions like 'What is the capital of France?' or \
                 'Summarize the Wikipedia page for AI'. Returns the search agent's answer."
            }
            SubAgentKind::Reason => {
                "Invokes the reasoning agent for calculations, unit conversions, date \
                 manipulations, logical reasoning, or solving mathematical expressions. \
                 Use this for questions like 'What is 2+2?' or 'Convert 100 miles to km'. \
                 Returns the reasoning agent's answer."
            }
        }
    }

    /// Tool categories the agent may call
    pub fn categories(self) -> &'static [ToolCategory] {
        match self {
            SubAgentKind::Search => ToolCategory::SEARCH,
            SubAgentKind::Reason => ToolCategory::REASONING,
        }
    }

    /// The task message that opens every run
    pub fn prompt(self, query: &str, context: &Map<String, Value>) -> String {
        let context = Value::Object(context.clone()).to_string();
        match self {
            SubAgentKind::Search => format!(
                r#"You are a research assistant that can search for information on Wikipedia.

TASK:
1. Search Wikipedia for information about: "{query}", use keywords.
2. Review the search results and select the MOST relevant article by its page ID.
3. Use get_page_sections_tool with the selected page ID to identify the sections of the article.
4. Identify the most relevant sections for answering the query (always include section '0', the introduction).
5. Use get_multiple_sections_content_tool to retrieve all relevant sections in a single call by passing the page ID and a list of section indices.
6. Based on the retrieved section contents, formulate a comprehensive answer to the query.

Be selective about which sections you retrieve. One call to get_multiple_sections_content_tool is better than several calls to get_section_content_tool.

Available tools:
- `search_wikipedia_tool`: search Wikipedia for articles related to the query
- `get_wikipedia_content_tool`: the full content of a page by its ID
- `get_page_sections_tool`: the sections of a page by its ID
- `get_section_content_tool`: the content of one section
- `get_multiple_sections_content_tool`: the content of several sections by page ID and section indices
- `clean_page_html_tool`: readable text from raw Wikipedia HTML

Hints:
- If the query is about a specific date or event, narrow the topic down by place or time, then read the most relevant section of that page (for an event in Berlin, the 'History' section of the Berlin page).
- If the query asks for a section of a page, retrieve that section directly and return its text as written.

Additional context: {context}"#
            ),
            SubAgentKind::Reason => format!(
                r#"You are a reasoning assistant capable of performing a wide range of calculations and analytical tasks.

TASK:
Analyze and solve the following problem: "{query}"

Follow these steps:
1. Understand what the question is asking for
2. Determine which tools are most appropriate to solve the problem
3. Break complex problems down into simpler steps
4. Use the calculation tools to solve each step
5. Explain your reasoning briefly
6. Present the final answer in a concise and understandable format

Available tools include:
- Mathematical operations (addition, subtraction, multiplication, division)
- Statistical calculations (mean, median, standard deviation, range)
- Unit conversions (metric and imperial length, mass, volume, speed, area, temperature)
- Date calculations (years or days between dates, age calculation)
- Text analysis (word count, reading time estimation)
- Symbolic math (expression evaluation, equation solving)

Additional context: {context}"#
            ),
        }
    }
}

impl fmt::Display for SubAgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubAgentKind::Search => write!(f, "search"),
            SubAgentKind::Reason => write!(f, "reason"),
        }
    }
}

/// A specialist agent
#[derive(Debug, Clone)]
pub struct SubAgent {
    kind: SubAgentKind,
    runner: AgenticLoop,
}

/// Builder for creating SubAgents
pub struct SubAgentBuilder {
    kind: SubAgentKind,
    provider: Option<Arc<dyn LLMProvider>>,
    model: Option<String>,
    scope: ToolScope,
    max_rounds: usize,
    temperature: f32,
}

impl SubAgentBuilder {
    /// Create a new builder for `kind`
    pub fn new(kind: SubAgentKind) -> Self {
        Self {
            kind,
            provider: None,
            model: None,
            scope: ToolScope::default(),
            max_rounds: 15,
            temperature: 0.0,
        }
    }

    /// Set the model provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the model to use
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the tools the agent may call
    pub fn scope(mut self, scope: ToolScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the round budget
    pub fn max_rounds(mut self, max: usize) -> Self {
        self.max_rounds = max;
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build the SubAgent
    pub fn build(self) -> Result<SubAgent> {
        let provider = self.provider.ok_or_else(|| {
            SwitchboardError::config(format!("{} agent needs a model provider", self.kind))
        })?;
        let model = self
            .model
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| SwitchboardError::config(format!("{} agent needs a model", self.kind)))?;

        if let Some(foreign) = self
            .scope
            .names()
            .into_iter()
            .find(|name| name.starts_with("call_"))
        {
            return Err(SwitchboardError::config(format!(
                "{} agent cannot delegate; '{}' is not allowed in its scope",
                self.kind, foreign
            )));
        }

        Ok(SubAgent {
            kind: self.kind,
            runner: AgenticLoop::new(
                format!("{} agent", self.kind),
                provider,
                model,
                self.scope,
                self.max_rounds,
                self.temperature,
            ),
        })
    }
}

impl SubAgent {
    /// Create a builder
    pub fn builder(kind: SubAgentKind) -> SubAgentBuilder {
        SubAgentBuilder::new(kind)
    }

    pub fn kind(&self) -> SubAgentKind {
        self.kind
    }

    pub fn model(&self) -> &str {
        self.runner.model()
    }

    /// Names of the tools in scope
    pub fn tool_names(&self) -> Vec<&str> {
        self.runner.scope().names()
    }

    /// Answer `query` in a private conversation and return only the final text
    pub async fn run(
        &self,
        query: &str,
        context: &Map<String, Value>,
        ctx: &ToolContext,
    ) -> Result<String> {
        let mut conversation = Conversation::new();
        conversation.push_human(self.kind.prompt(query, context))?;

        let outcome = self.runner.run(&mut conversation, ctx).await?;
        tracing::debug!(agent = %self.kind, rounds = outcome.rounds, "Sub-agent finished");
        Ok(outcome.answer)
    }
}
