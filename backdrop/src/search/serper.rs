//! Google search via the Serper API (https://serper.dev).
//!
//! `POST {base}/{category}` with `{"q": query}` and the `X-API-KEY` header. The
//! response carries results under a key named after the category (`news`, `images`,
//! ...) or under `organic` for plain web search.
//!
//! Requires `SERPER_API_KEY` in environment or passed via constructor.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{SearchError, SearchProvider, SearchResult};

const SERPER_API_BASE: &str = "https://google.serper.dev";
const API_KEY_ENV: &str = "SERPER_API_KEY";

pub struct SerperSearch {
    /// Sent as the `X-API-KEY` header.
    api_key: Arc<str>,
    base_url: String,
    client: reqwest::Client,
}

impl SerperSearch {
    pub fn new(api_key: impl Into<Arc<str>>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: SERPER_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Reads `SERPER_API_KEY` and the optional `SERPER_BASE_URL`.
    pub fn from_env() -> Result<Self, SearchError> {
        let key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SearchError::MissingApiKey(API_KEY_ENV))?;
        let search = Self::new(key);
        Ok(match std::env::var("SERPER_BASE_URL") {
            Ok(base) if !base.trim().is_empty() => search.with_base_url(base),
            _ => search,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

/// Maps a Serper response body to results, reading `category` then `organic`.
/// Entries without a `link` are skipped.
pub(crate) fn parse_results(
    body: &serde_json::Value,
    category: &str,
) -> Result<Vec<SearchResult>, SearchError> {
    let entries = body
        .get(category)
        .or_else(|| body.get("organic"))
        .and_then(|v| v.as_array());
    let Some(entries) = entries else {
        if body.is_object() {
            return Ok(Vec::new());
        }
        return Err(SearchError::Decode("response is not a JSON object".to_string()));
    };
    let text = |e: &serde_json::Value, key: &str| {
        e.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
    };
    Ok(entries
        .iter()
        .filter_map(|e| {
            let link = text(e, "link")?;
            Some(SearchResult {
                link,
                title: text(e, "title"),
                snippet: text(e, "snippet"),
                date: text(e, "date"),
                source: text(e, "source"),
            })
        })
        .collect())
}

#[async_trait]
impl SearchProvider for SerperSearch {
    async fn search(&self, query: &str, category: &str) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!("{}/{}", self.base_url, category);
        debug!(url = %url, query = %query, "serper search");
        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", self.api_key.as_ref())
            .json(&json!({ "q": query }))
            .send()
            .await
            .map_err(|e| SearchError::Transport(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        let results = parse_results(&body, category)?;
        debug!(query = %query, count = results.len(), "serper results");
        Ok(results)
    }
}
