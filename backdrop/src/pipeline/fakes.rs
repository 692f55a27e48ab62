//! In-memory fetcher and search provider for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::fetch::{Document, DocumentFetcher, DocumentMetadata, FetchError, FetchOptions};
use crate::search::{SearchError, SearchProvider, SearchResult};

pub(crate) fn doc(url: &str, content: &str) -> Document {
    Document {
        content: content.to_string(),
        source_url: url.to_string(),
        metadata: DocumentMetadata {
            title: Some(format!("Title of {}", url)),
            language: Some("en".into()),
            status: 200,
            content_type: Some("text/html".into()),
        },
    }
}

/// Serves pages by URL; unknown URLs answer 404, an error only under strict options.
/// Records every call with its options.
#[derive(Default)]
pub(crate) struct FakeFetcher {
    pages: HashMap<String, String>,
    timeouts: Vec<String>,
    unreachable: Vec<String>,
    pub(crate) calls: Mutex<Vec<(String, FetchOptions)>>,
}

impl FakeFetcher {
    pub(crate) fn with_page(mut self, url: &str, content: &str) -> Self {
        self.pages.insert(url.to_string(), content.to_string());
        self
    }

    pub(crate) fn with_timeout(mut self, url: &str) -> Self {
        self.timeouts.push(url.to_string());
        self
    }

    pub(crate) fn with_unreachable(mut self, url: &str) -> Self {
        self.unreachable.push(url.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, FetchOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, options: FetchOptions) -> Result<Document, FetchError> {
        self.calls.lock().unwrap().push((url.to_string(), options.clone()));
        if self.timeouts.iter().any(|u| u == url) {
            return Err(FetchError::Timeout(url.to_string()));
        }
        if self.unreachable.iter().any(|u| u == url) {
            return Err(FetchError::Transport(format!("{}: connection refused", url)));
        }
        match self.pages.get(url) {
            Some(content) => Ok(doc(url, content)),
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
    }
}

/// Answers each query with a fixed link list; unknown queries get no results.
#[derive(Default)]
pub(crate) struct FakeSearch {
    answers: HashMap<String, Vec<String>>,
    fail: bool,
    pub(crate) calls: Mutex<Vec<(String, String)>>,
}

impl FakeSearch {
    pub(crate) fn with_answer(mut self, query: &str, links: &[&str]) -> Self {
        self.answers
            .insert(query.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &str, category: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), category.to_string()));
        if self.fail {
            return Err(SearchError::Status {
                status: 401,
                body: "bad key".into(),
            });
        }
        Ok(self
            .answers
            .get(query)
            .map(|links| {
                links
                    .iter()
                    .map(|l| SearchResult {
                        link: l.clone(),
                        ..SearchResult::default()
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
