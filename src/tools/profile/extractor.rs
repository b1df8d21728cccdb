//! LLM-backed extraction of profile facts from a user message

use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, LazyLock};

use super::ProfileUpdate;
use crate::core::{Result, SwitchboardError, Turn};
use crate::llm::{GenerateOptions, LLMProvider};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]+?)\s*```").expect("code fence pattern is valid")
});

const EXTRACTION_PROMPT: &str = r#"You are a personal data extractor.
Given a user message, extract only the structured personal data in JSON format with the following fields:

- name: string (capitalize first letter only, e.g., "Alice")
- studies: string (capitalize first letter of each word, e.g., "Computer Science")
- age: number (e.g., 25)
- gender: string ("male", "female", "non-binary")
- likes: list of strings
  Each entry must be:
  - auto-corrected for spelling errors (e.g., "foottball" -> "Football")
  - capitalized (first letter uppercase, e.g., "football" -> "Football")
  - no empty entries or duplicates

### Guidelines:
- Correct obvious spelling mistakes (e.g., "foottball" -> "Football", "tehcnology" -> "Technology")
- Normalize plural/singular forms (e.g., "movies" -> "Movies")
- Expand common abbreviations using world knowledge:
  - "CS" -> "Computer Science"
  - "AI" -> "Artificial Intelligence"
  - "IT" -> "Information Technology"
- Only extract fields explicitly mentioned in the message
- If a field is not mentioned, omit it from the output
- Users may provide information incrementally across multiple messages

### Example Input:
"I'm Sarah, 22 years old, studying CS. I like books, foottball, and tech."

### Example Output:
{
  "name": "Sarah",
  "age": 22,
  "studies": "Computer Science",
  "likes": ["Books", "Football", "Tech"]
}

Now extract from:
"""{user_message}"""
"#;

/// Remove a Markdown code fence around the model's JSON, if there is one
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw.trim(), "$1").into_owned()
}

/// Asks a model for the profile facts stated in a message
pub struct ProfileExtractor {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl ProfileExtractor {
    pub fn new(provider: Arc<dyn LLMProvider>, model: &str) -> Self {
        Self {
            provider,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Extract and normalize the facts in `message`.
    ///
    /// A reply that is not a JSON object yields [`SwitchboardError::Extraction`]
    /// carrying the raw reply.
    pub async fn extract(&self, message: &str) -> Result<ProfileUpdate> {
        let prompt = EXTRACTION_PROMPT.replace("{user_message}", message);
        let response = self
            .provider
            .chat(
                &self.model,
                &[Turn::human(prompt)],
                Some(GenerateOptions::with_temperature(0.0)),
            )
            .await?;

        tracing::debug!(model = %self.model, raw = %response.content, "Profile extraction reply");
        parse_reply(&response.content)
    }
}

fn parse_reply(raw: &str) -> Result<ProfileUpdate> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str::<Value>(&cleaned)
        .map_err(|e| e.to_string())
        .and_then(|value| ProfileUpdate::from_value(&value).map_err(|e| e.to_string()))
        .map(ProfileUpdate::normalized)
        .map_err(|message| SwitchboardError::Extraction {
            message,
            raw_response: raw.to_string(),
        })
}

impl std::fmt::Debug for ProfileExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileExtractor")
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LLMResponse, ScriptedProvider};

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_unparseable_reply_keeps_raw_text() {
        match parse_reply("I could not find anything.") {
            Err(SwitchboardError::Extraction { raw_response, .. }) => {
                assert_eq!(raw_response, "I could not find anything.");
            }
            other => panic!("expected extraction error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_sends_message_in_prompt() {
        let provider = Arc::new(ScriptedProvider::new().respond(LLMResponse::text(
            "```json\n{\"name\": \"sarah\", \"likes\": [\"books\"]}\n```",
        )));
        let extractor = ProfileExtractor::new(provider.clone(), "extractor");

        let update = extractor.extract("I'm Sarah and I like books").await.unwrap();
        assert_eq!(update.name.as_deref(), Some("Sarah"));
        assert_eq!(update.likes, vec!["Books"]);

        let requests = provider.requests_for("extractor");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].turns[0].content.contains("\"\"\"I'm Sarah and I like books\"\"\""));
    }
}
