//! Orchestrator
//!
//! Top-level session driver. Each request runs the agentic loop over the
//! delegation and profile tools; the answer is the first assistant turn that
//! calls no tool.

use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::conversation::Conversation;
use crate::agent::memory::SessionMemory;
use crate::agent::runner::AgenticLoop;
use crate::core::{Config, Result, Role, SwitchboardError, ToolCategory};
use crate::llm::{LLMProvider, OllamaClient};
use crate::tools::profile::{ProfileStore, UserProfile};
use crate::tools::wiki::{DocumentService, WikiClient};
use crate::tools::{ToolContext, ToolRegistry};

const ORCHESTRATOR_PROMPT: &str = r#"You are a master orchestrator agent. Your primary goal is to understand a user's query and use the available specialist agents to construct a comprehensive answer.

You have access to the following tools:
- `call_search_agent`: for queries that require finding information, searching Wikipedia, or looking up facts. For example: 'What is the capital of France?', 'Summarize the Wikipedia page for AI'.
- `call_reason_agent`: for queries that involve calculations, unit conversions, date manipulations, logical reasoning, or solving mathematical expressions. For example: 'What is 2+2?', 'Convert 100 miles to km', 'How old am I if born on Jan 1, 2000?'.
- `extract_user_profile_info`: use this only if the user mentions personal information about themselves, such as their name, field of study, age, gender, or preferences (likes). The tool extracts and persists these details.

Your process:
1. Analyze: read the user's query in the latest human message.
2. Decompose: if the query needs several steps (e.g. "Find X and then calculate Y based on X"), break it into smaller sub-queries.
3. Delegate: for each sub-query, pick the most appropriate specialist and formulate a precise question for it.
4. Execute: call the chosen tool with that question.
5. Iterate: review the result. If another step is required, go back to step 3, using earlier results as context.
6. Synthesize: once every part of the query is covered, combine the results into one coherent answer.
7. Respond: give that answer directly. Do not call any more tools once you are ready to answer.

IMPORTANT:
- Every query you send to a specialist must be self-contained and clear. The query for the search agent should be the user's original query unless it has to be adjusted.
- Pay attention to the conversation history to keep track of earlier interactions and results.
- If a single call to one specialist answers the query, present its result (rephrased slightly if needed) as the final answer.
- Your final output must be the answer itself, not a message saying you are about to answer.

USER PROFILE HANDLING:
- If the user's message includes personal information, call `extract_user_profile_info` with the full user message.
- Do not extract or assume profile information yourself.
- Only refer to profile facts that appear in this system message.
- Never fabricate user facts or make assumptions based on names or stereotypes."#;

/// The full orchestrator system prompt, with known profile facts appended
pub fn orchestrator_prompt(profile_summary: Option<&str>) -> String {
    match profile_summary {
        Some(summary) => format!("{}\n\nKnown user profile: {}", ORCHESTRATOR_PROMPT, summary),
        None => ORCHESTRATOR_PROMPT.to_string(),
    }
}

/// Session driver that routes requests to the specialist agents
pub struct Orchestrator {
    /// Configuration
    config: Config,
    provider: Arc<dyn LLMProvider>,
    documents: Arc<dyn DocumentService>,
    store: Arc<ProfileStore>,
    /// Tools, sub-agents included
    registry: Arc<ToolRegistry>,
    /// Prior exchanges of this session
    memory: SessionMemory,
    user_id: String,
    /// Rounds used by the last request
    last_rounds: Option<usize>,
}

impl Orchestrator {
    /// Create an orchestrator backed by Ollama and the live Wikipedia API
    pub fn new(config: Config) -> Result<Self> {
        let provider: Arc<dyn LLMProvider> = Arc::new(OllamaClient::from_config(&config)?);
        let documents: Arc<dyn DocumentService> = Arc::new(WikiClient::from_config(&config.wiki)?);
        let store = Arc::new(ProfileStore::open(&config.profile.store_path)?);
        Self::with_provider(config, provider, documents, store)
    }

    /// Create an orchestrator over explicit collaborators
    pub fn with_provider(
        config: Config,
        provider: Arc<dyn LLMProvider>,
        documents: Arc<dyn DocumentService>,
        store: Arc<ProfileStore>,
    ) -> Result<Self> {
        let registry = ToolRegistry::standard(provider.clone(), documents.clone(), store.clone(), &config)?;
        Ok(Self {
            memory: SessionMemory::new(config.agent.history_cap),
            user_id: config.profile.default_user_id.clone(),
            config,
            provider,
            documents,
            store,
            registry: Arc::new(registry),
            last_rounds: None,
        })
    }

    /// Check that the provider is reachable and every configured model is available
    pub async fn initialize(&self) -> Result<()> {
        let models = self.provider.list_models().await?;
        tracing::debug!(?models, "Available models");

        let m = &self.config.models;
        for model in [&m.orchestrator, &m.search, &m.reason, &m.extractor] {
            if !self.provider.is_model_available(model).await? {
                return Err(SwitchboardError::ModelNotFound(model.clone()));
            }
        }
        Ok(())
    }

    /// Answer one request. Failures come back as a user-facing message.
    pub async fn process(&mut self, user_input: &str) -> String {
        match self.try_process(user_input).await {
            Ok(answer) => answer,
            Err(e) if e.is_reportable() => budget_message(&e),
            Err(e) => {
                tracing::error!(error = %e, "Request failed");
                format!("I apologize, but something went wrong while answering: {}", e)
            }
        }
    }

    /// Answer one request, returning the error on failure
    pub async fn try_process(&mut self, user_input: &str) -> Result<String> {
        let summary = self.store.summary(&self.user_id).await;

        let mut conversation = Conversation::new();
        conversation.push_system(orchestrator_prompt(summary.as_deref()))?;
        for turn in self.memory.turns() {
            match turn.role {
                Role::Human => conversation.push_human(turn.content.clone())?,
                _ => conversation.push_assistant(turn.clone())?,
            }
        }
        conversation.push_human(user_input)?;

        let ctx = ToolContext::new(&self.user_id);
        match self.runner().run(&mut conversation, &ctx).await {
            Ok(outcome) => {
                self.last_rounds = Some(outcome.rounds);
                self.memory.record(user_input, &outcome.answer);
                Ok(outcome.answer)
            }
            Err(e) if e.is_reportable() => {
                self.last_rounds = Some(self.config.agent.max_rounds);
                self.memory.record(user_input, budget_message(&e));
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn runner(&self) -> AgenticLoop {
        AgenticLoop::new(
            "orchestrator",
            self.provider.clone(),
            &self.config.models.orchestrator,
            self.registry.scope(ToolCategory::ORCHESTRATOR),
            self.config.agent.max_rounds,
            self.config.agent.orchestrator_temperature,
        )
    }

    /// Rebuild the sub-agents after a model or budget change
    fn rebuild_tools(&mut self) -> Result<()> {
        let registry = ToolRegistry::standard(
            self.provider.clone(),
            self.documents.clone(),
            self.store.clone(),
            &self.config,
        )?;
        self.registry = Arc::new(registry);
        Ok(())
    }

    /// Forget the session's prior exchanges
    pub fn clear_history(&mut self) {
        self.memory.clear();
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Set the orchestrator model
    pub fn set_orchestrator_model(&mut self, model: impl Into<String>) {
        self.config.models.orchestrator = model.into();
    }

    /// Set the search agent's model
    pub fn set_search_model(&mut self, model: impl Into<String>) -> Result<()> {
        self.config.models.search = model.into();
        self.rebuild_tools()
    }

    /// Set the reason agent's model
    pub fn set_reason_model(&mut self, model: impl Into<String>) -> Result<()> {
        self.config.models.reason = model.into();
        self.rebuild_tools()
    }

    /// Set the round budget of every loop
    pub fn set_max_rounds(&mut self, max_rounds: usize) -> Result<()> {
        if max_rounds == 0 {
            return Err(SwitchboardError::config("max rounds must be at least 1"));
        }
        self.config.agent.max_rounds = max_rounds;
        self.rebuild_tools()
    }

    /// Enable debug mode
    pub fn set_debug(&mut self, debug: bool) {
        self.config.agent.debug = debug;
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Switch to another user's profile; session memory is cleared
    pub fn set_user(&mut self, user_id: impl Into<String>) {
        self.user_id = user_id.into();
        self.memory.clear();
    }

    /// The current user's stored profile
    pub async fn profile(&self) -> Option<UserProfile> {
        self.store.get(&self.user_id).await
    }

    /// Number of remembered turns
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    pub fn last_rounds(&self) -> Option<usize> {
        self.last_rounds
    }

    /// Names of the tools the orchestrator can call
    pub fn tool_names(&self) -> Vec<String> {
        self.registry
            .list_for(ToolCategory::ORCHESTRATOR)
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Total number of registered tools
    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<String>> {
        self.provider.list_models().await
    }

    /// Save current configuration to file
    pub fn save_config(&self) -> Result<PathBuf> {
        self.config.save()
    }
}

fn budget_message(e: &SwitchboardError) -> String {
    format!("I couldn't finish answering this request: {}.", e)
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("model", &self.config.models.orchestrator)
            .field("user_id", &self.user_id)
            .field("memory", &self.memory.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_profile_invents_nothing() {
        let prompt = orchestrator_prompt(None);
        assert!(!prompt.contains("Known user profile"));
        assert!(prompt.contains("call_search_agent"));
        assert!(prompt.contains("extract_user_profile_info"));
    }

    #[test]
    fn test_prompt_carries_profile_summary() {
        let prompt = orchestrator_prompt(Some("User's name is Dennis and studies Business."));
        assert!(prompt.ends_with("Known user profile: User's name is Dennis and studies Business."));
    }
}
