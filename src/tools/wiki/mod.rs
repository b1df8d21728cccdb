//! Wikipedia lookup
//!
//! The search agent reaches Wikipedia through the [`DocumentService`] trait.
//! [`WikiClient`] talks to the MediaWiki API; [`StaticDocuments`] serves pages
//! from memory.

mod clean;
mod client;
mod static_docs;
mod tool;

pub use clean::{clean_page_html, strip_tags};
pub use client::WikiClient;
pub use static_docs::{StaticDocuments, StaticPage};
pub use tool::{WikiOp, WikiTool};

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::{Result, ToolCategory};
use crate::tools::registry::{ToolRegistry, ToolSpec};

/// Index of the lead section, listed before any titled section
pub const INTRODUCTION_INDEX: &str = "0";

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub pageid: u64,
    /// Snippet with all markup removed
    pub snippet: String,
}

/// Section titles of a page, introduction first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionListing {
    pub titles: Vec<String>,
    /// Section index -> title
    pub index_map: BTreeMap<String, String>,
}

impl SectionListing {
    /// Start a listing with the introduction as section "0"
    pub fn with_introduction() -> Self {
        let mut listing = Self::default();
        listing.push(INTRODUCTION_INDEX, "Introduction");
        listing
    }

    pub fn push(&mut self, index: impl Into<String>, title: impl Into<String>) {
        let title = title.into();
        self.titles.push(title.clone());
        self.index_map.insert(index.into(), title);
    }
}

/// Source of encyclopedia pages
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Search for pages matching `query`
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// List a page's sections
    async fn get_sections(&self, page_id: u64) -> Result<SectionListing>;

    /// Cleaned text of one section
    async fn get_section(&self, page_id: u64, index: &str) -> Result<String>;

    /// Cleaned text of the whole page
    async fn get_page_content(&self, page_id: u64) -> Result<String>;

    /// Fetch several sections concurrently. A section that fails maps to its
    /// error text instead of failing the batch.
    async fn get_multiple_sections(
        &self,
        page_id: u64,
        indices: &[String],
    ) -> BTreeMap<String, String> {
        let fetches = indices.iter().map(|index| async move {
            let text = match self.get_section(page_id, index).await {
                Ok(text) => text,
                Err(e) => format!("Error retrieving section {}: {}", index, e),
            };
            (index.clone(), text)
        });

        join_all(fetches).await.into_iter().collect()
    }
}

/// Register the Wikipedia tools, one per [`WikiOp`]
pub fn register_tools(
    registry: &mut ToolRegistry,
    documents: Arc<dyn DocumentService>,
    search_limit: usize,
) -> Result<()> {
    for op in WikiOp::ALL {
        let tool = WikiTool::new(*op, documents.clone(), search_limit);
        registry.register(ToolSpec::new(
            tool.definition(),
            ToolCategory::Search,
            Arc::new(tool),
        ))?;
    }
    Ok(())
}
