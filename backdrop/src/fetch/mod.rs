//! Document fetching: URL in, page text and metadata out.
//!
//! [`DocumentFetcher`] is the seam the pipeline depends on; [`WebFetcher`] is the
//! HTTP implementation. Tests plug in their own fetchers.

mod web;

pub use web::WebFetcher;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error from [`DocumentFetcher::fetch`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL does not parse or is not http(s).
    #[error("invalid URL {0}")]
    InvalidUrl(String),

    /// Connection, TLS or redirect failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not finish within the configured timeout.
    #[error("timed out fetching {0}")]
    Timeout(String),

    /// Non-success HTTP status (only with `require_success_status`).
    #[error("HTTP status {0}")]
    Status(u16),

    /// Body could not be read or decoded.
    #[error("body error: {0}")]
    Body(String),
}

/// Per-call fetch options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Whole-request timeout; `None` uses the fetcher's own default.
    pub timeout: Option<Duration>,
    /// Fail with [`FetchError::Status`] on non-2xx responses.
    pub require_success_status: bool,
}

impl FetchOptions {
    /// Options used for per-URL extraction: bounded time, success status required.
    pub fn strict(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            require_success_status: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub language: Option<String>,
    /// HTTP status of the response the document was read from.
    pub status: u16,
    pub content_type: Option<String>,
}

/// A fetched page. Immutable once fetched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub source_url: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Renders metadata and content for use inside an LLM prompt.
    pub fn to_prompt(&self) -> String {
        let mut out = format!("source: {}\n", self.source_url);
        if let Some(ref title) = self.metadata.title {
            out.push_str(&format!("title: {}\n", title));
        }
        if let Some(ref lang) = self.metadata.language {
            out.push_str(&format!("language: {}\n", lang));
        }
        out.push_str("content:\n");
        out.push_str(&self.content);
        out
    }
}

/// Fetches a document by URL.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str, options: FetchOptions) -> Result<Document, FetchError>;
}
