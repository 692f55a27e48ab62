//! Fake collaborators for pipeline integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use backdrop::{
    Document, DocumentFetcher, DocumentMetadata, FetchError, FetchOptions, SearchError,
    SearchProvider, SearchResult,
};

/// Serves pages from memory. URLs marked slow never answer within the caller's
/// timeout; unknown URLs answer 404.
#[derive(Default)]
pub struct PageFetcher {
    pages: HashMap<String, String>,
    slow: HashSet<String>,
    /// Fetches finished (ok or error), seed included.
    pub finished: Arc<AtomicUsize>,
    pub requested: Mutex<Vec<String>>,
}

impl PageFetcher {
    pub fn page(mut self, url: &str, content: &str) -> Self {
        self.pages.insert(url.to_string(), content.to_string());
        self
    }

    pub fn slow(mut self, url: &str) -> Self {
        self.slow.insert(url.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for PageFetcher {
    async fn fetch(&self, url: &str, options: FetchOptions) -> Result<Document, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        let result = if self.slow.contains(url) {
            let limit = options.timeout.unwrap_or(Duration::from_secs(30));
            match tokio::time::timeout(limit, tokio::time::sleep(Duration::from_secs(3600))).await {
                Ok(()) => Err(FetchError::Body("unreachable".into())),
                Err(_) => Err(FetchError::Timeout(url.to_string())),
            }
        } else {
            match self.pages.get(url) {
                Some(content) => Ok(Document {
                    content: content.clone(),
                    source_url: url.to_string(),
                    metadata: DocumentMetadata {
                        title: Some(format!("Page {}", url)),
                        language: Some("en".into()),
                        status: 200,
                        content_type: Some("text/html".into()),
                    },
                }),
                None if options.require_success_status => Err(FetchError::Status(404)),
                None => Ok(Document {
                    source_url: url.to_string(),
                    metadata: DocumentMetadata {
                        status: 404,
                        ..DocumentMetadata::default()
                    },
                    ..Document::default()
                }),
            }
        };
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Answers each query with fixed links.
#[derive(Default)]
pub struct LinkSearch {
    answers: HashMap<String, Vec<String>>,
    pub raw_results: AtomicUsize,
}

impl LinkSearch {
    pub fn answer(mut self, query: &str, links: &[&str]) -> Self {
        self.answers
            .insert(query.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }
}

#[async_trait]
impl SearchProvider for LinkSearch {
    async fn search(&self, query: &str, _category: &str) -> Result<Vec<SearchResult>, SearchError> {
        let links = self.answers.get(query).cloned().unwrap_or_default();
        self.raw_results.fetch_add(links.len(), Ordering::SeqCst);
        Ok(links
            .into_iter()
            .map(|link| SearchResult {
                link,
                ..SearchResult::default()
            })
            .collect())
    }
}

/// `source_url` values found in a prompt that embeds history items as JSON.
pub fn source_urls_in(prompt: &str) -> Vec<String> {
    prompt
        .lines()
        .filter_map(|l| l.trim().strip_prefix("\"source_url\": \""))
        .map(|rest| rest.trim_end_matches(',').trim_end_matches('"').to_string())
        .collect()
}

/// URL from the `source:` line of a rendered document prompt.
pub fn prompt_source(prompt: &str) -> String {
    prompt
        .lines()
        .find_map(|l| l.strip_prefix("source: "))
        .unwrap_or_default()
        .to_string()
}
