//! HTTP document fetcher: reqwest for transport, scraper for HTML-to-text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;
use url::Url;

use super::{Document, DocumentFetcher, DocumentMetadata, FetchError, FetchOptions};

const USER_AGENT: &str = concat!("backdrop/", env!("CARGO_PKG_VERSION"));

/// Elements whose text is never part of the visible page.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg"];

/// Fetches pages over HTTP(S) and extracts their visible text.
pub struct WebFetcher {
    client: Client,
    default_timeout: Option<Duration>,
}

impl WebFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            default_timeout: None,
        })
    }

    /// Timeout used when [`FetchOptions::timeout`] is `None`.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }
}

fn parse_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl(format!(
            "{}: unsupported scheme {}",
            url, other
        ))),
    }
}

fn map_send_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Transport(format!("{}: {}", url, e))
    }
}

fn is_html(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.contains("html"))
        .unwrap_or(true)
}

/// Appends a text node with every whitespace run (source newlines included) as one space.
fn push_inline(out: &mut String, text: &str) {
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
}

/// Trims each line and drops empty ones. Only block elements put newlines in the input.
fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => push_inline(out, t),
            Node::Element(e) if SKIPPED_ELEMENTS.contains(&e.name()) => {}
            Node::Element(e) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    let block = matches!(
                        e.name(),
                        "p" | "div" | "br" | "li" | "tr" | "section" | "article"
                            | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
                    );
                    if block {
                        out.push('\n');
                    }
                    collect_text(child_el, out);
                    if block {
                        out.push('\n');
                    }
                }
            }
            _ => {}
        }
    }
}

fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .next()
        .map(|el| el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
}

/// Extracts `(title, language, visible text)` from an HTML page.
pub(crate) fn extract_html(body: &str) -> (Option<String>, Option<String>, String) {
    let doc = Html::parse_document(body);
    let title = first_text(&doc, "title").or_else(|| first_text(&doc, "h1"));
    let language = Selector::parse("html").ok().and_then(|sel| {
        doc.select(&sel)
            .next()
            .and_then(|el| el.value().attr("lang"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    });
    let root = Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
        .unwrap_or_else(|| doc.root_element());
    let mut raw = String::new();
    collect_text(root, &mut raw);
    (title, language, collapse_whitespace(&raw))
}

#[async_trait]
impl DocumentFetcher for WebFetcher {
    async fn fetch(&self, url: &str, options: FetchOptions) -> Result<Document, FetchError> {
        let parsed = parse_url(url)?;
        let mut request = self.client.get(parsed.as_str());
        if let Some(t) = options.timeout.or(self.default_timeout) {
            request = request.timeout(t);
        }
        debug!(url = %parsed, timeout = ?options.timeout, "fetching document");

        let response = request.send().await.map_err(|e| map_send_error(url, e))?;
        let status = response.status();
        if options.require_success_status && !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.to_string())
            } else {
                FetchError::Body(format!("{}: {}", url, e))
            }
        })?;

        let (title, language, content) = if is_html(content_type.as_deref()) {
            extract_html(&body)
        } else {
            (None, None, body)
        };
        debug!(url = %parsed, status = status.as_u16(), chars = content.len(), "fetched document");

        Ok(Document {
            content,
            source_url: url.to_string(),
            metadata: DocumentMetadata {
                title,
                language,
                status: status.as_u16(),
                content_type,
            },
        })
    }
}
