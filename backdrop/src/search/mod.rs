//! Web search: query in, ranked result links out.

mod serper;

pub use serper::SerperSearch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("missing API key ({0} not set)")]
    MissingApiKey(&'static str),

    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success status from the search API (auth and quota failures land here).
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// One ranked result. Only `link` is required.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Search provider. Results are in rank order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Searches `query` within `category` (e.g. `"news"`, `"search"`).
    async fn search(&self, query: &str, category: &str) -> Result<Vec<SearchResult>, SearchError>;
}
