//! MediaWiki API client

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::{clean_page_html, strip_tags, DocumentService, SearchHit, SectionListing};
use crate::core::config::WikiConfig;
use crate::core::{Result, SwitchboardError};

/// Wikipedia over the MediaWiki action API
#[derive(Clone)]
pub struct WikiClient {
    client: Client,
    api_url: String,
}

impl WikiClient {
    /// Create a client from configuration
    pub fn from_config(config: &WikiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| {
                SwitchboardError::document(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Issue a GET against the API with the common format parameters
    async fn query(&self, params: &[(&str, String)]) -> Result<Value> {
        tracing::debug!(?params, "MediaWiki request");

        let response = self
            .client
            .get(&self.api_url)
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SwitchboardError::document(format!(
                "MediaWiki API returned {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        check_api_error(&body)?;
        Ok(body)
    }

    async fn parse_text(&self, page_id: u64, section: Option<&str>) -> Result<String> {
        let mut params = vec![
            ("action", "parse".to_string()),
            ("pageid", page_id.to_string()),
            ("prop", "text".to_string()),
            ("disabletoc", "1".to_string()),
            ("disableeditsection", "1".to_string()),
        ];
        if let Some(section) = section {
            params.push(("section", section.to_string()));
        }

        let body = self.query(&params).await?;
        let html = parse_html(&body)?;
        Ok(clean_page_html(&html))
    }
}

#[async_trait]
impl DocumentService for WikiClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let body = self
            .query(&[
                ("action", "query".to_string()),
                ("list", "search".to_string()),
                ("srsearch", query.to_string()),
                ("srlimit", limit.to_string()),
            ])
            .await?;
        parse_search(&body, limit)
    }

    async fn get_sections(&self, page_id: u64) -> Result<SectionListing> {
        let body = self
            .query(&[
                ("action", "parse".to_string()),
                ("pageid", page_id.to_string()),
                ("prop", "sections".to_string()),
            ])
            .await?;
        parse_sections(&body)
    }

    async fn get_section(&self, page_id: u64, index: &str) -> Result<String> {
        self.parse_text(page_id, Some(index)).await
    }

    async fn get_page_content(&self, page_id: u64) -> Result<String> {
        self.parse_text(page_id, None).await
    }
}

fn check_api_error(body: &Value) -> Result<()> {
    match body.get("error") {
        Some(error) => {
            let info = error
                .get("info")
                .and_then(Value::as_str)
                .or_else(|| error.get("code").and_then(Value::as_str))
                .unwrap_or("unknown error");
            Err(SwitchboardError::document(info))
        }
        None => Ok(()),
    }
}

/// Search hits from a `list=search` response
pub(crate) fn parse_search(body: &Value, limit: usize) -> Result<Vec<SearchHit>> {
    check_api_error(body)?;
    let hits = body
        .pointer("/query/search")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    Ok(hits
        .iter()
        .take(limit)
        .filter_map(|hit| {
            Some(SearchHit {
                title: hit.get("title")?.as_str()?.to_string(),
                pageid: hit.get("pageid")?.as_u64()?,
                snippet: strip_tags(hit.get("snippet").and_then(Value::as_str).unwrap_or("")),
            })
        })
        .collect())
}

/// Section listing from a `prop=sections` response
pub(crate) fn parse_sections(body: &Value) -> Result<SectionListing> {
    check_api_error(body)?;
    let sections = body
        .pointer("/parse/sections")
        .and_then(Value::as_array)
        .ok_or_else(|| SwitchboardError::document("Response has no section list"))?;

    let mut listing = SectionListing::with_introduction();
    for section in sections {
        let index = match section.get("index") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        // transcluded sections carry a "T-" index and cannot be fetched by pageid
        if index.is_empty() || index.starts_with('T') {
            continue;
        }
        let title = section
            .get("line")
            .and_then(Value::as_str)
            .map(strip_tags)
            .unwrap_or_default();
        listing.push(index, title);
    }
    Ok(listing)
}

/// Rendered HTML from a `prop=text` response
pub(crate) fn parse_html(body: &Value) -> Result<String> {
    check_api_error(body)?;
    let text = body
        .pointer("/parse/text")
        .ok_or_else(|| SwitchboardError::document("Content could not be retrieved."))?;

    // formatversion=2 gives a string; the legacy shape nests it under "*"
    text.as_str()
        .or_else(|| text.get("*").and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| SwitchboardError::document("Content could not be retrieved."))
}
