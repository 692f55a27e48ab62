//! Orchestrator: wires the five stages into a state graph and runs it.
//!
//! ```text
//! START → init → history_queries → history_urls ─┬─► history_extract ─┐
//!                                                ├─► history_extract ─┼─► history_summary → END
//!                                                └─► ...              ─┘
//! ```
//!
//! `history_urls → history_extract` is a fan-out: one task per discovered URL, each
//! seeing only its URL. The run reaches `history_summary` once every task finished.

use std::sync::Arc;

use tracing::Instrument;

use crate::error::PipelineError;
use crate::fetch::DocumentFetcher;
use crate::graph::{CompiledStateGraph, Dispatch, NodeMiddleware, StateGraph, END, START};
use crate::llm::CompletionService;
use crate::search::SearchProvider;

use super::nodes::{
    ExtractNode, InitNode, QueryGenerationNode, SummaryNode, UrlDiscoveryNode, HISTORY_EXTRACT,
    HISTORY_QUERIES, HISTORY_SUMMARY, HISTORY_URLS, INIT,
};
use super::state::pipeline_updater;
use super::{PipelineConfig, PipelineState};

/// External services a run talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub search: Arc<dyn SearchProvider>,
    pub llm: Arc<dyn CompletionService>,
}

/// One extraction task per discovered URL.
fn distribute_urls(state: &PipelineState) -> Vec<Dispatch<PipelineState>> {
    state
        .urls()
        .iter()
        .map(|url| Dispatch::new(HISTORY_EXTRACT, PipelineState::seed(url.clone())))
        .collect()
}

/// Builds the pipeline graph for `config` over `collab`.
pub fn build_graph(
    config: &PipelineConfig,
    collab: &Collaborators,
    middleware: Option<Arc<dyn NodeMiddleware<PipelineState>>>,
) -> Result<CompiledStateGraph<PipelineState>, PipelineError> {
    let mut graph = StateGraph::<PipelineState>::new().with_state_updater(pipeline_updater());
    if let Some(mw) = middleware {
        graph = graph.with_middleware(mw);
    }
    graph
        .add_node(INIT, Arc::new(InitNode::new(collab.fetcher.clone())))
        .add_node(
            HISTORY_QUERIES,
            Arc::new(QueryGenerationNode::new(
                collab.llm.clone(),
                config.top_n_search_queries,
            )),
        )
        .add_node(
            HISTORY_URLS,
            Arc::new(UrlDiscoveryNode::new(
                collab.search.clone(),
                config.top_n_search_results,
                config.search_category.clone(),
            )),
        )
        .add_node(
            HISTORY_EXTRACT,
            Arc::new(ExtractNode::new(
                collab.fetcher.clone(),
                collab.llm.clone(),
                config.extract_timeout,
            )),
        )
        .add_node(
            HISTORY_SUMMARY,
            Arc::new(SummaryNode::new(collab.llm.clone(), config.summary_max_sources)),
        )
        .add_edge(START, INIT)
        .add_edge(INIT, HISTORY_QUERIES)
        .add_edge(HISTORY_QUERIES, HISTORY_URLS)
        .add_fan_out(HISTORY_URLS, Arc::new(distribute_urls), [HISTORY_EXTRACT])
        .add_edge(HISTORY_EXTRACT, HISTORY_SUMMARY)
        .add_edge(HISTORY_SUMMARY, END);
    Ok(graph.compile()?)
}

/// Runs the historical-context pipeline.
pub struct Orchestrator {
    graph: CompiledStateGraph<PipelineState>,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig, collab: Collaborators) -> Result<Self, PipelineError> {
        Ok(Self {
            graph: build_graph(&config, &collab, None)?,
        })
    }

    /// Like [`new`](Self::new), with middleware around every node run (fan-out tasks included).
    pub fn with_middleware(
        config: PipelineConfig,
        collab: Collaborators,
        middleware: Arc<dyn NodeMiddleware<PipelineState>>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            graph: build_graph(&config, &collab, Some(middleware))?,
        })
    }

    /// Runs from `url` to the terminal state. On `Ok`, `history_summary` is set.
    pub async fn run(&self, url: &str) -> Result<PipelineState, PipelineError> {
        let span = tracing::info_span!("pipeline_run", url = %url);
        tracing::info!(parent: &span, "pipeline run start");
        let state = self
            .graph
            .invoke(PipelineState::seed(url))
            .instrument(span.clone())
            .await?;
        let scheduled = state.urls().len();
        let contributed = state.history_info.len();
        tracing::info!(
            parent: &span,
            scheduled,
            contributed,
            dropped = scheduled.saturating_sub(contributed),
            "extraction results"
        );
        if state.history_summary.is_none() {
            return Err(PipelineError::ExecutionFailed(
                "run ended without history_summary".into(),
            ));
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::graph::LoggingNodeMiddleware;
    use crate::llm::{Completion, LlmError, MockLlm};
    use crate::pipeline::fakes::{FakeFetcher, FakeSearch};
    use serde_json::json;

    fn item_for(url: &str) -> serde_json::Value {
        json!({
            "event_time": "2020",
            "publish_time": "2021",
            "title": format!("About {}", url),
            "summary": "Earlier developments.",
            "source_url": url
        })
    }

    /// Scripted model: two queries, an item per page (source URL taken from the prompt), a fixed summary.
    fn scripted_llm() -> MockLlm {
        MockLlm::from_fn(|call| match call.schema.as_deref() {
            Some("search_queries") => Ok(Completion::Structured(json!({ "queries": ["q1", "q2"] }))),
            Some("history_item") => {
                let url = call
                    .user_prompt
                    .lines()
                    .find_map(|l| l.strip_prefix("source: "))
                    .unwrap_or_default();
                Ok(Completion::Structured(item_for(url)))
            }
            Some(other) => Err(LlmError::Api(format!("unexpected schema {}", other))),
            None => Ok(Completion::Text("Summary of the backdrop.".into())),
        })
    }

    fn collab(fetcher: FakeFetcher, search: FakeSearch, llm: Arc<MockLlm>) -> Collaborators {
        Collaborators {
            fetcher: Arc::new(fetcher),
            search: Arc::new(search),
            llm,
        }
    }

    /// **Scenario**: One extraction task per unique URL; all items are merged before the summary.
    #[tokio::test]
    async fn run_fans_out_one_task_per_url() {
        let fetcher = FakeFetcher::default()
            .with_page("https://example.com/article", "seed")
            .with_page("https://a", "a")
            .with_page("https://b", "b")
            .with_page("https://c", "c");
        let search = FakeSearch::default()
            .with_answer("q1", &["https://a", "https://b"])
            .with_answer("q2", &["https://b", "https://c"]);
        let llm = Arc::new(scripted_llm());
        let orch = Orchestrator::new(PipelineConfig::default(), collab(fetcher, search, llm.clone()))
            .unwrap();

        let state = orch.run("https://example.com/article").await.unwrap();
        assert_eq!(state.urls().len(), 3);
        assert_eq!(llm.call_count("history_item"), 3);
        let mut sources: Vec<_> = state.history_info.iter().map(|i| i.source_url.clone()).collect();
        sources.sort();
        assert_eq!(sources, vec!["https://a", "https://b", "https://c"]);
        assert_eq!(state.history_summary.as_deref(), Some("Summary of the backdrop."));

        // The summary call is the last one and sees every item.
        let last = llm.calls().pop().unwrap();
        assert_eq!(last.schema, None);
        for url in ["https://a", "https://b", "https://c"] {
            assert!(last.user_prompt.contains(url), "{}", url);
        }
    }

    /// **Scenario**: No search results still reaches the summary with empty history.
    #[tokio::test]
    async fn run_with_no_urls_still_summarizes() {
        let fetcher = FakeFetcher::default().with_page("https://example.com/article", "seed");
        let llm = Arc::new(scripted_llm());
        let orch = Orchestrator::new(
            PipelineConfig::default(),
            collab(fetcher, FakeSearch::default(), llm.clone()),
        )
        .unwrap();
        let state = orch.run("https://example.com/article").await.unwrap();
        assert_eq!(state.history_urls, Some(vec![]));
        assert!(state.history_info.is_empty());
        assert!(state.history_summary.is_some());
        assert_eq!(llm.call_count("history_item"), 0);
    }

    #[tokio::test]
    async fn seed_fetch_failure_aborts_run() {
        let llm = Arc::new(scripted_llm());
        let orch = Orchestrator::new(
            PipelineConfig::default(),
            collab(
                FakeFetcher::default().with_unreachable("https://example.com/article"),
                FakeSearch::default(),
                llm.clone(),
            ),
        )
        .unwrap();
        let err = orch.run("https://example.com/article").await.unwrap_err();
        assert!(matches!(err, PipelineError::Fetch(FetchError::Transport(_))), "{}", err);
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn search_failure_aborts_run() {
        let fetcher = FakeFetcher::default().with_page("https://example.com/article", "seed");
        let orch = Orchestrator::new(
            PipelineConfig::default(),
            collab(fetcher, FakeSearch::failing(), Arc::new(scripted_llm())),
        )
        .unwrap();
        let err = orch.run("https://example.com/article").await.unwrap_err();
        assert!(matches!(err, PipelineError::Search(_)), "{}", err);
    }

    /// **Scenario**: Middleware wraps every node including fan-out tasks without changing the result.
    #[tokio::test]
    async fn run_with_logging_middleware() {
        let fetcher = FakeFetcher::default()
            .with_page("https://example.com/article", "seed")
            .with_page("https://a", "a");
        let search = FakeSearch::default().with_answer("q1", &["https://a"]);
        let orch = Orchestrator::with_middleware(
            PipelineConfig::default(),
            collab(fetcher, search, Arc::new(scripted_llm())),
            Arc::new(LoggingNodeMiddleware::<PipelineState>::default()),
        )
        .unwrap();
        let state = orch.run("https://example.com/article").await.unwrap();
        assert_eq!(state.history_info.len(), 1);
    }
}
