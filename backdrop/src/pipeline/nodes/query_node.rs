//! Query generation node: ask the model for search queries about what preceded the document.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::graph::{Next, Node};
use crate::llm::{complete_structured, CompletionService};
use crate::pipeline::prompts::{document_prompt, query_system_prompt};
use crate::pipeline::{PipelineState, SearchQueries};

use super::{original_doc, HISTORY_QUERIES};

pub struct QueryGenerationNode {
    llm: Arc<dyn CompletionService>,
    top_n: usize,
}

impl QueryGenerationNode {
    pub fn new(llm: Arc<dyn CompletionService>, top_n: usize) -> Self {
        Self { llm, top_n }
    }
}

#[async_trait]
impl Node<PipelineState> for QueryGenerationNode {
    fn id(&self) -> &str {
        HISTORY_QUERIES
    }

    async fn run(&self, state: PipelineState) -> Result<(PipelineState, Next), PipelineError> {
        let doc = original_doc(&state, HISTORY_QUERIES)?;
        let queries: SearchQueries = complete_structured(
            self.llm.as_ref(),
            &query_system_prompt(self.top_n),
            &document_prompt(doc),
        )
        .await?;
        let received = queries.queries.len();
        let queries = queries.truncated(self.top_n);
        tracing::info!(received, kept = queries.queries.len(), "search queries generated");
        Ok((
            PipelineState {
                history_queries: Some(queries),
                ..PipelineState::default()
            },
            Next::Continue,
        ))
    }
}
