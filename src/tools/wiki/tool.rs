//! Wikipedia tool definitions and dispatch

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{clean_page_html, DocumentService, INTRODUCTION_INDEX};
use crate::core::{Result, SwitchboardError, ToolCall, ToolDefinition, ToolResult};
use crate::tools::registry::{ToolContext, ToolHandler};

/// The Wikipedia operations exposed to the search agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WikiOp {
    Search,
    PageContent,
    Sections,
    Section,
    MultipleSections,
    CleanHtml,
}

impl WikiOp {
    pub const ALL: &'static [WikiOp] = &[
        WikiOp::Search,
        WikiOp::PageContent,
        WikiOp::Sections,
        WikiOp::Section,
        WikiOp::MultipleSections,
        WikiOp::CleanHtml,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WikiOp::Search => "search_wikipedia_tool",
            WikiOp::PageContent => "get_wikipedia_content_tool",
            WikiOp::Sections => "get_page_sections_tool",
            WikiOp::Section => "get_section_content_tool",
            WikiOp::MultipleSections => "get_multiple_sections_content_tool",
            WikiOp::CleanHtml => "clean_page_html_tool",
        }
    }

    fn definition(self) -> ToolDefinition {
        let page_id = json!({"type": "integer", "description": "Wikipedia page ID"});
        let (description, properties, required) = match self {
            WikiOp::Search => (
                "Search Wikipedia and return matching article titles, page IDs and snippets.",
                json!({"query": {"type": "string", "description": "Search query"}}),
                vec!["query"],
            ),
            WikiOp::PageContent => (
                "Retrieve the full cleaned text of a Wikipedia article by page ID.",
                json!({"page_id": page_id}),
                vec!["page_id"],
            ),
            WikiOp::Sections => (
                "List the section titles of a Wikipedia page with their indices. The introduction is section '0'.",
                json!({"page_id": page_id}),
                vec!["page_id"],
            ),
            WikiOp::Section => (
                "Get the cleaned text of one section of a Wikipedia page.",
                json!({
                    "page_id": page_id,
                    "section_index": {"type": "string", "description": "Section index, e.g. '0' or '3'"}
                }),
                vec!["page_id", "section_index"],
            ),
            WikiOp::MultipleSections => (
                "Get the text of several sections of a Wikipedia page in one call.",
                json!({
                    "page_id": page_id,
                    "section_indices": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Section indices to retrieve; include '0' for the introduction"
                    }
                }),
                vec!["page_id", "section_indices"],
            ),
            WikiOp::CleanHtml => (
                "Clean Wikipedia HTML content to extract readable text.",
                json!({"html_content": {"type": "string", "description": "HTML content to clean"}}),
                vec!["html_content"],
            ),
        };

        ToolDefinition::function(
            self.name(),
            description,
            json!({"type": "object", "properties": properties, "required": required}),
        )
    }
}

/// A Wikipedia tool bound to a document service
pub struct WikiTool {
    op: WikiOp,
    documents: Arc<dyn DocumentService>,
    search_limit: usize,
}

impl WikiTool {
    pub fn new(op: WikiOp, documents: Arc<dyn DocumentService>, search_limit: usize) -> Self {
        Self {
            op,
            documents,
            search_limit,
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        self.op.definition()
    }

    async fn run(&self, call: &ToolCall) -> Result<String> {
        match self.op {
            WikiOp::Search => {
                let query = required_string(call, "query")?;
                let hits = self.documents.search(&query, self.search_limit).await?;
                if hits.is_empty() {
                    return Ok(format!("No Wikipedia pages matched '{}'.", query));
                }
                Ok(serde_json::to_string_pretty(&hits)?)
            }
            WikiOp::PageContent => {
                let text = self.documents.get_page_content(page_id(call)?).await?;
                Ok(non_empty(text, "Content could not be retrieved."))
            }
            WikiOp::Sections => {
                let listing = self.documents.get_sections(page_id(call)?).await?;
                Ok(serde_json::to_string_pretty(&listing)?)
            }
            WikiOp::Section => {
                let index = call
                    .get_string("section_index")
                    .or_else(|| call.get_i64("section_index").map(|i| i.to_string()))
                    .unwrap_or_else(|| INTRODUCTION_INDEX.to_string());
                let text = self.documents.get_section(page_id(call)?, &index).await?;
                Ok(non_empty(text, "This section has no text."))
            }
            WikiOp::MultipleSections => {
                let indices = call.get_string_list("section_indices").ok_or_else(|| {
                    SwitchboardError::tool("'section_indices' must be a list of section indices")
                })?;
                let sections = self
                    .documents
                    .get_multiple_sections(page_id(call)?, &indices)
                    .await;
                Ok(serde_json::to_string_pretty(&sections)?)
            }
            WikiOp::CleanHtml => {
                let html = required_string(call, "html_content")?;
                Ok(non_empty(clean_page_html(&html), "No readable text found."))
            }
        }
    }
}

#[async_trait]
impl ToolHandler for WikiTool {
    async fn invoke(&self, call: &ToolCall, _ctx: &ToolContext) -> Result<ToolResult> {
        let output = self.run(call).await?;
        Ok(ToolResult::success(self.op.name(), output))
    }
}

fn page_id(call: &ToolCall) -> Result<u64> {
    call.get_i64("page_id")
        .and_then(|id| u64::try_from(id).ok())
        .ok_or_else(|| SwitchboardError::tool("'page_id' must be a positive integer"))
}

fn required_string(call: &ToolCall, key: &str) -> Result<String> {
    call.get_string(key)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| SwitchboardError::tool(format!("Missing argument '{}'", key)))
}

fn non_empty(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

impl std::fmt::Debug for WikiTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiTool").field("op", &self.op).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::wiki::{StaticDocuments, StaticPage};
    use serde_json::Value;

    fn tool(op: WikiOp) -> WikiTool {
        let docs = StaticDocuments::new().with_page(
            StaticPage::new(42, "Douglas Adams", "Douglas Adams was an English author.")
                .section("Career", "He wrote The Hitchhiker's Guide to the Galaxy."),
        );
        WikiTool::new(op, Arc::new(docs), 5)
    }

    #[tokio::test]
    async fn test_search_returns_json_hits() {
        let out = tool(WikiOp::Search)
            .run(&ToolCall::new("search_wikipedia_tool", json!({"query": "douglas adams"})))
            .await
            .unwrap();
        let hits: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(hits[0]["pageid"], 42);
    }

    #[tokio::test]
    async fn test_multiple_sections_accept_numeric_indices() {
        let out = tool(WikiOp::MultipleSections)
            .run(&ToolCall::new(
                "get_multiple_sections_content_tool",
                json!({"page_id": "42", "section_indices": [0, "1"]}),
            ))
            .await
            .unwrap();
        let sections: Value = serde_json::from_str(&out).unwrap();
        assert!(sections["0"].as_str().unwrap().contains("English author"));
        assert!(sections["1"].as_str().unwrap().contains("Hitchhiker"));
    }

    #[tokio::test]
    async fn test_bad_page_id_is_an_error() {
        let result = tool(WikiOp::Sections)
            .run(&ToolCall::new("get_page_sections_tool", json!({"page_id": "abc"})))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_clean_html_returns_readable_text() {
        let html = r#"<div><p>Paris is the capital<sup class="reference">[1]</sup> of France.</p><script>var x;</script><h2>History</h2></div>"#;
        let out = tool(WikiOp::CleanHtml)
            .run(&ToolCall::new("clean_page_html_tool", json!({"html_content": html})))
            .await
            .unwrap();
        assert!(out.contains("Paris is the capital of France."), "{}", out);
        assert!(out.contains("History"));
        assert!(!out.contains('<') && !out.contains("var x"));

        let empty = tool(WikiOp::CleanHtml)
            .run(&ToolCall::new("clean_page_html_tool", json!({"html_content": "<script>x</script>"})))
            .await
            .unwrap();
        assert_eq!(empty, "No readable text found.");

        assert!(tool(WikiOp::CleanHtml)
            .run(&ToolCall::new("clean_page_html_tool", json!({})))
            .await
            .is_err());
    }
}
