//! URL discovery node: search every query and union the top links.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::graph::{Next, Node};
use crate::pipeline::PipelineState;
use crate::search::SearchProvider;

use super::HISTORY_URLS;

pub struct UrlDiscoveryNode {
    search: Arc<dyn SearchProvider>,
    top_n: usize,
    category: String,
}

impl UrlDiscoveryNode {
    pub fn new(search: Arc<dyn SearchProvider>, top_n: usize, category: impl Into<String>) -> Self {
        Self {
            search,
            top_n,
            category: category.into(),
        }
    }
}

#[async_trait]
impl Node<PipelineState> for UrlDiscoveryNode {
    fn id(&self) -> &str {
        HISTORY_URLS
    }

    /// Queries run one after another; the first search error aborts the run.
    async fn run(&self, state: PipelineState) -> Result<(PipelineState, Next), PipelineError> {
        let queries = state
            .history_queries
            .as_ref()
            .map(|q| q.queries.as_slice())
            .unwrap_or(&[]);

        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        let mut raw = 0usize;
        for query in queries {
            let results = self.search.search(query, &self.category).await?;
            for result in results.into_iter().take(self.top_n) {
                raw += 1;
                if seen.insert(result.link.clone()) {
                    urls.push(result.link);
                }
            }
        }
        tracing::info!(queries = queries.len(), raw, unique = urls.len(), "history urls discovered");
        Ok((
            PipelineState {
                history_urls: Some(urls),
                ..PipelineState::default()
            },
            Next::Continue,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fakes::FakeSearch;
    use crate::pipeline::SearchQueries;
    use crate::search::SearchError;

    fn state_with_queries(queries: &[&str]) -> PipelineState {
        PipelineState {
            history_queries: Some(SearchQueries {
                queries: queries.iter().map(|q| q.to_string()).collect(),
            }),
            ..PipelineState::seed("u")
        }
    }

    /// **Scenario**: Overlapping results are deduplicated; only the top-N links of each query count.
    #[tokio::test]
    async fn overlapping_results_are_deduplicated() {
        let search = Arc::new(
            FakeSearch::default()
                .with_answer("q1", &["https://a", "https://b", "https://z"])
                .with_answer("q2", &["https://b", "https://c", "https://y"]),
        );
        let node = UrlDiscoveryNode::new(search.clone(), 2, "news");
        let (update, _) = node.run(state_with_queries(&["q1", "q2"])).await.unwrap();

        let mut urls = update.history_urls.unwrap();
        urls.sort();
        assert_eq!(urls, vec!["https://a", "https://b", "https://c"]);
        assert_eq!(
            search.calls(),
            vec![("q1".to_string(), "news".to_string()), ("q2".to_string(), "news".to_string())]
        );
    }

    #[tokio::test]
    async fn no_queries_yields_empty_url_list() {
        let node = UrlDiscoveryNode::new(Arc::new(FakeSearch::default()), 5, "news");
        let (update, _) = node.run(state_with_queries(&[])).await.unwrap();
        assert_eq!(update.history_urls, Some(vec![]));
    }

    #[tokio::test]
    async fn search_error_is_fatal() {
        let node = UrlDiscoveryNode::new(Arc::new(FakeSearch::failing()), 5, "news");
        let err = node.run(state_with_queries(&["q"])).await.unwrap_err();
        assert!(matches!(err, PipelineError::Search(SearchError::Status { status: 401, .. })));
    }
}
