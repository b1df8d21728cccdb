//! In-memory document service

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::{DocumentService, SearchHit, SectionListing, INTRODUCTION_INDEX};
use crate::core::{Result, SwitchboardError};

/// A page held in memory: an introduction plus titled sections
#[derive(Debug, Clone)]
pub struct StaticPage {
    pub pageid: u64,
    pub title: String,
    pub introduction: String,
    /// (title, text), indexed from "1"
    pub sections: Vec<(String, String)>,
}

impl StaticPage {
    pub fn new(pageid: u64, title: impl Into<String>, introduction: impl Into<String>) -> Self {
        Self {
            pageid,
            title: title.into(),
            introduction: introduction.into(),
            sections: Vec::new(),
        }
    }

    pub fn section(mut self, title: impl Into<String>, text: impl Into<String>) -> Self {
        self.sections.push((title.into(), text.into()));
        self
    }

    fn text_of(&self, index: &str) -> Option<&str> {
        if index == INTRODUCTION_INDEX {
            return Some(&self.introduction);
        }
        let n: usize = index.parse().ok()?;
        self.sections.get(n.checked_sub(1)?).map(|(_, text)| text.as_str())
    }
}

/// Document service over a fixed set of pages. Search matches any page whose
/// title or introduction contains every word of the query.
#[derive(Debug, Clone, Default)]
pub struct StaticDocuments {
    pages: BTreeMap<u64, StaticPage>,
}

impl StaticDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: StaticPage) -> Self {
        self.pages.insert(page.pageid, page);
        self
    }

    fn page(&self, page_id: u64) -> Result<&StaticPage> {
        self.pages
            .get(&page_id)
            .ok_or_else(|| SwitchboardError::document(format!("There is no page with ID {}.", page_id)))
    }
}

#[async_trait]
impl DocumentService for StaticDocuments {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

        Ok(self
            .pages
            .values()
            .filter(|page| {
                let haystack = format!("{} {}", page.title, page.introduction).to_lowercase();
                words.iter().all(|w| haystack.contains(w.as_str()))
            })
            .take(limit)
            .map(|page| SearchHit {
                title: page.title.clone(),
                pageid: page.pageid,
                snippet: page.introduction.chars().take(120).collect(),
            })
            .collect())
    }

    async fn get_sections(&self, page_id: u64) -> Result<SectionListing> {
        let page = self.page(page_id)?;
        let mut listing = SectionListing::with_introduction();
        for (i, (title, _)) in page.sections.iter().enumerate() {
            listing.push((i + 1).to_string(), title.clone());
        }
        Ok(listing)
    }

    async fn get_section(&self, page_id: u64, index: &str) -> Result<String> {
        let page = self.page(page_id)?;
        page.text_of(index)
            .map(str::to_string)
            .ok_or_else(|| SwitchboardError::document(format!("Section {} does not exist.", index)))
    }

    async fn get_page_content(&self, page_id: u64) -> Result<String> {
        let page = self.page(page_id)?;
        let mut blocks = vec![page.introduction.clone()];
        for (title, text) in &page.sections {
            blocks.push(title.clone());
            blocks.push(text.clone());
        }
        Ok(blocks.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> StaticDocuments {
        StaticDocuments::new().with_page(
            StaticPage::new(9232, "Eiffel Tower", "The Eiffel Tower is a wrought-iron lattice tower in Paris.")
                .section("History", "Construction began in 1887.")
                .section("Design", "It is 330 metres tall."),
        )
    }

    #[tokio::test]
    async fn test_search_matches_all_words() {
        let docs = docs();
        assert_eq!(docs.search("eiffel paris", 5).await.unwrap().len(), 1);
        assert!(docs.search("eiffel london", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_multiple_sections_include_introduction() {
        let docs = docs();
        let indices = vec!["0".to_string(), "2".to_string(), "9".to_string()];
        let sections = docs.get_multiple_sections(9232, &indices).await;

        assert!(!sections["0"].is_empty());
        assert_eq!(sections["2"], "It is 330 metres tall.");
        assert!(sections["9"].starts_with("Error retrieving section 9"));
    }

    #[test]
    fn test_unknown_page() {
        let docs = docs();
        assert!(tokio_test::block_on(docs.get_sections(1)).is_err());

        let listing = tokio_test::block_on(docs.get_sections(9232)).unwrap();
        assert_eq!(listing.titles, vec!["Introduction", "History", "Design"]);
    }
}
