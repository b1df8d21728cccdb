//! Profile extraction through the orchestrator and persistence across sessions

use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

use switchboard::core::{Role, ToolCall};
use switchboard::llm::{LLMResponse, ScriptedProvider};
use switchboard::tools::profile::ProfileStore;
use switchboard::tools::wiki::StaticDocuments;
use switchboard::{Config, Orchestrator};

fn config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.models.orchestrator = "orch".to_string();
    config.models.search = "search".to_string();
    config.models.reason = "reason".to_string();
    config.models.extractor = "extractor".to_string();
    config.agent.max_rounds = 15;
    config.profile.store_path = dir.path().join("profiles.json");
    config.profile.default_user_id = "user_001".to_string();
    config
}

fn orchestrator(dir: &TempDir, provider: Arc<ScriptedProvider>) -> Orchestrator {
    let config = config(dir);
    let store = Arc::new(ProfileStore::open(&config.profile.store_path).unwrap());
    Orchestrator::with_provider(config, provider, Arc::new(StaticDocuments::new()), store).unwrap()
}

fn extract_call(message: &str) -> LLMResponse {
    LLMResponse::tools(vec![ToolCall::new(
        "extract_user_profile_info",
        json!({ "message": message }),
    )])
}

#[tokio::test]
async fn test_profile_is_extracted_and_used_next_session() {
    let dir = TempDir::new().unwrap();
    let message = "I'm Sarah, 22 years old, studying CS. I like books and football.";

    let provider = Arc::new(
        ScriptedProvider::new()
            .respond_for("orch", extract_call(message))
            .respond_for("orch", LLMResponse::text("Nice to meet you, Sarah!"))
            .respond_for(
                "extractor",
                LLMResponse::text(
                    "```json\n{\"name\": \"Sarah\", \"age\": 22, \"studies\": \"CS\", \"likes\": [\"books\", \"Football\"]}\n```",
                ),
            ),
    );
    let mut agent = orchestrator(&dir, provider.clone());
    assert_eq!(agent.process(message).await, "Nice to meet you, Sarah!");

    let profile = agent.profile().await.unwrap();
    assert_eq!(profile.name, "Sarah");
    assert_eq!(profile.studies, "Computer Science");
    assert_eq!(profile.age, "22");
    assert!(profile.likes.contains("Books") && profile.likes.contains("Football"));

    // a new session reads the stored profile into its system prompt
    let provider = Arc::new(
        ScriptedProvider::new().respond_for("orch", LLMResponse::text("You study Computer Science.")),
    );
    let mut next = orchestrator(&dir, provider.clone());
    next.process("What do I study?").await;

    let request = &provider.requests_for("orch")[0];
    assert_eq!(request.turns[0].role, Role::System);
    assert!(request.turns[0]
        .content
        .contains("Known user profile: User's name is Sarah, studies Computer Science"));
}

#[tokio::test]
async fn test_repeated_and_partial_updates() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond_for("orch", extract_call("I'm Dennis and I like chess"))
            .respond_for("orch", LLMResponse::text("ok"))
            .respond_for("orch", extract_call("I like chess"))
            .respond_for("orch", LLMResponse::text("ok"))
            .respond_for(
                "extractor",
                LLMResponse::text(r#"{"name": "Dennis", "likes": ["chess"]}"#),
            )
            .respond_for("extractor", LLMResponse::text(r#"{"name": "", "likes": ["Chess"]}"#)),
    );
    let mut agent = orchestrator(&dir, provider);

    agent.process("I'm Dennis and I like chess").await;
    let first = agent.profile().await.unwrap();
    agent.process("I like chess").await;
    let second = agent.profile().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.name, "Dennis");
    assert_eq!(second.likes.len(), 1);
}

#[tokio::test]
async fn test_unparseable_extraction_leaves_profile_untouched() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond_for("orch", extract_call("my name is... never mind"))
            .respond_for("orch", LLMResponse::text("No problem."))
            .respond_for("extractor", LLMResponse::text("Sorry, nothing to extract.")),
    );
    let mut agent = orchestrator(&dir, provider.clone());

    assert_eq!(agent.process("my name is... never mind").await, "No problem.");
    assert!(agent.profile().await.is_none());

    let second = &provider.requests_for("orch")[1];
    let result = second.turns.iter().find(|t| t.role == Role::Tool).unwrap();
    let body: serde_json::Value = serde_json::from_str(&result.content).unwrap();
    assert_eq!(body["raw_response"], "Sorry, nothing to extract.");
}

#[tokio::test]
async fn test_profiles_follow_the_session_user() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(
        ScriptedProvider::new()
            .respond_for("orch", extract_call("I'm Ada"))
            .respond_for("orch", LLMResponse::text("Hi Ada"))
            .respond_for("extractor", LLMResponse::text(r#"{"name": "Ada"}"#)),
    );
    let mut agent = orchestrator(&dir, provider);
    agent.set_user("user_042");
    agent.process("I'm Ada").await;

    let store = ProfileStore::open(dir.path().join("profiles.json")).unwrap();
    assert_eq!(store.get("user_042").await.unwrap().name, "Ada");
    assert!(store.get("user_001").await.is_none());
}
