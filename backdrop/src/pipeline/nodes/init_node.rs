//! Init node: fetch the seed URL into `original_doc`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::fetch::{DocumentFetcher, FetchOptions};
use crate::graph::{Next, Node};
use crate::pipeline::PipelineState;

use super::INIT;

pub struct InitNode {
    fetcher: Arc<dyn DocumentFetcher>,
}

impl InitNode {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Node<PipelineState> for InitNode {
    fn id(&self) -> &str {
        INIT
    }

    /// Fetch failures are fatal for the run.
    async fn run(&self, state: PipelineState) -> Result<(PipelineState, Next), PipelineError> {
        let doc = self.fetcher.fetch(&state.url, FetchOptions::default()).await?;
        tracing::info!(url = %state.url, chars = doc.content.len(), "original document fetched");
        Ok((
            PipelineState {
                original_doc: Some(doc),
                ..PipelineState::default()
            },
            Next::Continue,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::pipeline::fakes::FakeFetcher;

    #[tokio::test]
    async fn init_sets_original_doc_with_default_options() {
        let fetcher = Arc::new(FakeFetcher::default().with_page("https://example.com/article", "body"));
        let node = InitNode::new(fetcher.clone());
        let (update, next) = node
            .run(PipelineState::seed("https://example.com/article"))
            .await
            .unwrap();
        assert_eq!(next, Next::Continue);
        assert_eq!(update.original_doc.unwrap().content, "body");
        assert_eq!(fetcher.calls()[0].1, FetchOptions::default());
    }

    /// **Scenario**: An unreachable seed is a fatal fetch error.
    #[tokio::test]
    async fn init_propagates_fetch_error() {
        let fetcher = FakeFetcher::default().with_unreachable("https://gone.example");
        let node = InitNode::new(Arc::new(fetcher));
        let err = node.run(PipelineState::seed("https://gone.example")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Fetch(FetchError::Transport(_))), "{}", err);
    }

    /// **Scenario**: A 404 seed page is not an error under default options; the page is kept as fetched.
    #[tokio::test]
    async fn init_keeps_non_success_page() {
        let node = InitNode::new(Arc::new(FakeFetcher::default()));
        let (update, _) = node.run(PipelineState::seed("https://gone.example")).await.unwrap();
        assert_eq!(update.original_doc.unwrap().metadata.status, 404);
    }
}
