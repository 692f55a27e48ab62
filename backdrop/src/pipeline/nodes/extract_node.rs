//! Extraction node: the fan-out task. Fetches one URL and asks the model for a [`HistoryItem`].
//!
//! Runs once per discovered URL with a state holding only that URL. Every failure is
//! logged and turned into an empty contribution, so one bad page never aborts the run.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::fetch::{DocumentFetcher, FetchOptions};
use crate::graph::{Next, Node};
use crate::llm::{complete_structured, CompletionService};
use crate::pipeline::prompts::{document_prompt, extract_system_prompt};
use crate::pipeline::{HistoryItem, PipelineState};

use super::HISTORY_EXTRACT;

pub struct ExtractNode {
    fetcher: Arc<dyn DocumentFetcher>,
    llm: Arc<dyn CompletionService>,
    timeout: Duration,
}

impl ExtractNode {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        llm: Arc<dyn CompletionService>,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            llm,
            timeout,
        }
    }

    async fn extract(&self, url: &str) -> Result<HistoryItem, PipelineError> {
        let doc = self
            .fetcher
            .fetch(url, FetchOptions::strict(self.timeout))
            .await?;
        let mut item: HistoryItem = complete_structured(
            self.llm.as_ref(),
            extract_system_prompt(),
            &document_prompt(&doc),
        )
        .await?;
        if item.source_url.trim().is_empty() {
            item.source_url = url.to_string();
        }
        Ok(item)
    }
}

#[async_trait]
impl Node<PipelineState> for ExtractNode {
    fn id(&self) -> &str {
        HISTORY_EXTRACT
    }

    /// Contributes zero or one item; never fails.
    async fn run(&self, state: PipelineState) -> Result<(PipelineState, Next), PipelineError> {
        let history_info = match self.extract(&state.url).await {
            Ok(item) => {
                tracing::debug!(url = %state.url, title = %item.title, "history item extracted");
                vec![item]
            }
            Err(e) => {
                tracing::warn!(url = %state.url, error = %e, "extraction failed, skipping url");
                Vec::new()
            }
        };
        Ok((
            PipelineState {
                history_info,
                ..PipelineState::default()
            },
            Next::Continue,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::pipeline::fakes::FakeFetcher;
    use serde_json::json;

    fn item_json(url: &str) -> serde_json::Value {
        json!({
            "event_time": "2022",
            "publish_time": "2023-03-01",
            "title": "Earlier event",
            "summary": "What happened before.",
            "source_url": url
        })
    }

    /// **Scenario**: A reachable page yields exactly one item; the fetch is strict with the configured timeout.
    #[tokio::test]
    async fn extract_success_contributes_one_item() {
        let fetcher = Arc::new(FakeFetcher::default().with_page("https://a", "page a"));
        let llm = Arc::new(MockLlm::new().with_structured("history_item", item_json("https://a")));
        let node = ExtractNode::new(fetcher.clone(), llm.clone(), Duration::from_secs(15));

        let (update, next) = node.run(PipelineState::seed("https://a")).await.unwrap();
        assert_eq!(next, Next::Continue);
        assert_eq!(update.history_info.len(), 1);
        assert_eq!(update.history_info[0].source_url, "https://a");
        assert_eq!(fetcher.calls()[0].1, FetchOptions::strict(Duration::from_secs(15)));
        assert!(llm.calls()[0].user_prompt.contains("page a"));
    }

    /// **Scenario**: Fetch timeout and non-success status contribute nothing and do not fail.
    #[tokio::test]
    async fn fetch_failures_contribute_nothing() {
        let fetcher = Arc::new(FakeFetcher::default().with_timeout("https://slow"));
        let llm = Arc::new(MockLlm::new().with_structured("history_item", item_json("x")));
        let node = ExtractNode::new(fetcher, llm.clone(), Duration::from_secs(15));

        for url in ["https://slow", "https://missing"] {
            let (update, _) = node.run(PipelineState::seed(url)).await.unwrap();
            assert!(update.history_info.is_empty(), "{}", url);
        }
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn completion_failures_contribute_nothing() {
        let fetcher = Arc::new(FakeFetcher::default().with_page("https://a", "page a"));
        let bad_schema = Arc::new(MockLlm::new().with_structured("history_item", json!({ "title": "t" })));
        let node = ExtractNode::new(fetcher.clone(), bad_schema, Duration::from_secs(1));
        let (update, _) = node.run(PipelineState::seed("https://a")).await.unwrap();
        assert!(update.history_info.is_empty());

        let quota = Arc::new(MockLlm::new().with_failure("history_item", "quota exceeded"));
        let node = ExtractNode::new(fetcher, quota, Duration::from_secs(1));
        let (update, _) = node.run(PipelineState::seed("https://a")).await.unwrap();
        assert!(update.history_info.is_empty());
    }

    #[tokio::test]
    async fn blank_source_url_is_filled_with_task_url() {
        let fetcher = Arc::new(FakeFetcher::default().with_page("https://a", "page a"));
        let llm = Arc::new(MockLlm::new().with_structured("history_item", item_json("")));
        let node = ExtractNode::new(fetcher, llm, Duration::from_secs(1));
        let (update, _) = node.run(PipelineState::seed("https://a")).await.unwrap();
        assert_eq!(update.history_info[0].source_url, "https://a");
    }
}
