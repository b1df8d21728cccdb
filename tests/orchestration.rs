//! End-to-end runs of the orchestrator and its sub-agents against a scripted
//! model and an in-memory encyclopedia.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use tempfile::TempDir;

use switchboard::agent::{AgenticLoop, Conversation, Orchestrator, SubAgent, SubAgentKind};
use switchboard::core::{Role, ToolCall, ToolCategory, Turn};
use switchboard::llm::{LLMResponse, ScriptedProvider};
use switchboard::tools::profile::ProfileStore;
use switchboard::tools::wiki::{self, StaticDocuments, StaticPage};
use switchboard::tools::{calculator, ToolContext, ToolRegistry};
use switchboard::{Config, SwitchboardError};

fn config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.models.orchestrator = "orch".to_string();
    config.models.search = "search".to_string();
    config.models.reason = "reason".to_string();
    config.models.extractor = "extractor".to_string();
    config.agent.max_rounds = 15;
    config.agent.history_cap = 40;
    config.profile.store_path = dir.path().join("profiles.json");
    config.profile.default_user_id = "user_001".to_string();
    config
}

fn documents() -> StaticDocuments {
    StaticDocuments::new()
        .with_page(
            StaticPage::new(
                9232,
                "Eiffel Tower",
                "The Eiffel Tower is a wrought-iron lattice tower on the Champ de Mars in Paris.",
            )
            .section("History", "The tower was built for the 1889 World's Fair.")
            .section("Design", "The tower is 330 metres tall."),
        )
        .with_page(StaticPage::new(
            11867,
            "Germany",
            "Germany is a country in Central Europe. Its capital is Berlin.",
        ))
}

fn orchestrator(dir: &TempDir, provider: Arc<ScriptedProvider>) -> Orchestrator {
    let config = config(dir);
    let store = Arc::new(ProfileStore::open(&config.profile.store_path).unwrap());
    Orchestrator::with_provider(config, provider, Arc::new(documents()), store).unwrap()
}

fn tool_results(turns: &[Turn]) -> Vec<&Turn> {
    turns.iter().filter(|t| t.role == Role::Tool).collect()
}

#[tokio::test]
async fn test_unit_conversion_flows_through_reason_agent() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond_for(
                "orch",
                LLMResponse::tools(vec![ToolCall::new(
                    "call_reason_agent",
                    json!({"query": "Convert 100 miles to kilometers"}),
                )]),
            )
            .respond_for("orch", LLMResponse::text("100 miles is about 160.9 kilometers."))
            .respond_for(
                "reason",
                LLMResponse::tools(vec![ToolCall::new(
                    "convert_units_tool",
                    json!({"value": 100, "from_unit": "miles", "to_unit": "kilometers"}),
                )]),
            )
            .respond_for("reason", LLMResponse::text("100 miles = 160.9 kilometers")),
    );
    let mut agent = orchestrator(&dir, provider.clone());

    let answer = agent.process("Convert 100 miles to kilometers").await;
    assert!(answer.contains("160.9"), "{}", answer);
    assert_eq!(agent.last_rounds(), Some(2));

    let reason = provider.requests_for("reason");
    assert_eq!(reason.len(), 2);
    assert!(reason[0].tool_names.contains(&"convert_units_tool".to_string()));
    assert!(!reason[0].tool_names.contains(&"search_wikipedia_tool".to_string()));
    let conversion = tool_results(&reason[1].turns);
    assert_eq!(conversion[0].content, "160.9 kilometer");

    // only the sub-agent's final text reaches the orchestrator
    let orch = provider.requests_for("orch");
    let delegated = tool_results(&orch[1].turns);
    assert_eq!(delegated.len(), 1);
    assert_eq!(delegated[0].content, "100 miles = 160.9 kilometers");
    assert!(orch[1].turns.iter().all(|t| t.source_tool.as_deref() != Some("convert_units_tool")));
}

#[tokio::test]
async fn test_two_plus_two_in_reasoning_scope() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond(LLMResponse::tools(vec![ToolCall::new(
                "add_tool",
                json!({"numbers": [2, 2]}),
            )]))
            .respond(LLMResponse::text("2 + 2 = 4")),
    );
    let mut registry = ToolRegistry::new();
    calculator::register_tools(&mut registry).unwrap();
    let runner = AgenticLoop::new(
        "reason agent",
        provider,
        "reason",
        registry.scope(ToolCategory::REASONING),
        15,
        0.0,
    );

    let mut conversation = Conversation::new();
    conversation.push_human("What is 2+2?").unwrap();
    let outcome = runner
        .run(&mut conversation, &ToolContext::new("user_001"))
        .await
        .unwrap();

    assert!(outcome.rounds <= 2);
    assert!(outcome.answer.contains('4'));
    assert_eq!(tool_results(conversation.turns())[0].content, "4");
}

#[tokio::test]
async fn test_search_agent_reads_introduction() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond(LLMResponse::tools(vec![ToolCall::new(
                "search_wikipedia_tool",
                json!({"query": "Eiffel Tower"}),
            )]))
            .respond(LLMResponse::tools(vec![ToolCall::new(
                "get_page_sections_tool",
                json!({"page_id": 9232}),
            )]))
            .respond(LLMResponse::tools(vec![ToolCall::new(
                "get_multiple_sections_content_tool",
                json!({"page_id": 9232, "section_indices": ["0", "2"]}),
            )]))
            .respond(LLMResponse::text("The Eiffel Tower is 330 metres tall.")),
    );
    let mut registry = ToolRegistry::new();
    wiki::register_tools(&mut registry, Arc::new(documents()), 5).unwrap();
    let agent = SubAgent::builder(SubAgentKind::Search)
        .provider(provider.clone())
        .model("search")
        .scope(registry.scope(ToolCategory::SEARCH))
        .build()
        .unwrap();

    let answer = agent
        .run("How tall is the Eiffel Tower?", &Map::new(), &ToolContext::new("u"))
        .await
        .unwrap();
    assert!(answer.contains("330"));

    let last = provider.requests().pop().unwrap();
    let results = tool_results(&last.turns);
    assert_eq!(results.len(), 3);

    let listing: Value = serde_json::from_str(&results[1].content).unwrap();
    assert_eq!(listing["titles"][0], "Introduction");

    let sections: Value = serde_json::from_str(&results[2].content).unwrap();
    assert!(!sections["0"].as_str().unwrap().is_empty());
    assert_eq!(sections["2"], "The tower is 330 metres tall.");
}

#[tokio::test]
async fn test_parallel_delegation_keeps_request_order() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond_for(
                "orch",
                LLMResponse::tools(vec![
                    ToolCall::new("call_search_agent", json!({"query": "Capital of Germany?"})),
                    ToolCall::new("call_reason_agent", json!({"query": "What is 6*7?"})),
                ]),
            )
            .respond_for("orch", LLMResponse::text("Berlin, and 42."))
            .respond_for("search", LLMResponse::text("Berlin"))
            .respond_for("reason", LLMResponse::text("42")),
    );
    let mut agent = orchestrator(&dir, provider.clone());

    let answer = agent.try_process("Capital of Germany, and 6*7?").await.unwrap();
    assert_eq!(answer, "Berlin, and 42.");

    let second = &provider.requests_for("orch")[1];
    let calls: usize = second.turns.iter().map(|t| t.tool_calls.len()).sum();
    let results = tool_results(&second.turns);
    assert_eq!(calls, results.len());
    assert_eq!(results[0].content, "Berlin");
    assert_eq!(results[0].tool_call_id.as_deref(), Some("call_1_0"));
    assert_eq!(results[1].content, "42");
    assert_eq!(results[1].tool_call_id.as_deref(), Some("call_1_1"));
}

#[tokio::test]
async fn test_unknown_tool_does_not_end_the_run() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond_for(
                "orch",
                LLMResponse::tools(vec![ToolCall::new("add_tool", json!({"numbers": [2, 2]}))]),
            )
            .respond_for("orch", LLMResponse::text("Let me answer directly: 4")),
    );
    let mut agent = orchestrator(&dir, provider.clone());

    let answer = agent.try_process("What is 2+2?").await.unwrap();
    assert_eq!(answer, "Let me answer directly: 4");

    let second = &provider.requests_for("orch")[1];
    let failure = &tool_results(&second.turns)[0].content;
    assert!(failure.contains("Unknown tool: add_tool"));
    assert!(failure.contains("call_search_agent"));
    assert!(failure.contains("call_reason_agent"));
}

#[tokio::test]
async fn test_endless_tool_calls_exhaust_the_budget() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(ScriptedProvider::new().repeat(LLMResponse::tools(vec![
        ToolCall::new("lookup_everything", json!({})),
    ])));
    let mut agent = orchestrator(&dir, provider.clone());
    agent.set_max_rounds(3).unwrap();

    let err = agent.try_process("Never stop").await.unwrap_err();
    match err {
        SwitchboardError::LoopBudgetExceeded { agent: name, max_rounds } => {
            assert_eq!(name, "orchestrator");
            assert_eq!(max_rounds, 3);
        }
        other => panic!("expected budget error, got {:?}", other),
    }
    assert_eq!(provider.requests().len(), 3);

    // the failed exchange is still remembered
    assert_eq!(agent.memory_len(), 2);

    let message = agent.process("Again").await;
    assert!(message.contains("did not reach an answer within 3 rounds"));
}

#[tokio::test]
async fn test_sub_agent_failure_is_recoverable() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond_for(
                "orch",
                LLMResponse::tools(vec![ToolCall::new(
                    "call_search_agent",
                    json!({"query": "Who built the tower?"}),
                )]),
            )
            .respond_for("orch", LLMResponse::text("I could not look that up.")),
    );
    let mut agent = orchestrator(&dir, provider.clone());

    assert_eq!(
        agent.try_process("Who built the tower?").await.unwrap(),
        "I could not look that up."
    );
    let second = &provider.requests_for("orch")[1];
    assert!(tool_results(&second.turns)[0]
        .content
        .starts_with("Error running search agent:"));
}

#[tokio::test]
async fn test_session_memory_seeds_next_request() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond_for("orch", LLMResponse::text("Hello!"))
            .respond_for("orch", LLMResponse::text("You said hi.")),
    );
    let mut agent = orchestrator(&dir, provider.clone());

    agent.process("hi").await;
    agent.process("What did I say?").await;

    let second = &provider.requests_for("orch")[1];
    let roles: Vec<Role> = second.turns.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::Human, Role::Assistant, Role::Human]
    );
    assert_eq!(second.turns[1].content, "hi");
    assert_eq!(second.turns[2].content, "Hello!");

    agent.clear_history();
    assert_eq!(agent.memory_len(), 0);
}
