//! Summary node: free-text historical context for the original document.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::graph::{Next, Node};
use crate::llm::{complete_text, CompletionService};
use crate::pipeline::prompts::{summary_system_prompt, summary_user_prompt};
use crate::pipeline::PipelineState;

use super::{original_doc, HISTORY_SUMMARY};

pub struct SummaryNode {
    llm: Arc<dyn CompletionService>,
    max_sources: usize,
}

impl SummaryNode {
    pub fn new(llm: Arc<dyn CompletionService>, max_sources: usize) -> Self {
        Self { llm, max_sources }
    }
}

#[async_trait]
impl Node<PipelineState> for SummaryNode {
    fn id(&self) -> &str {
        HISTORY_SUMMARY
    }

    /// Runs with whatever history was gathered, including none.
    async fn run(&self, state: PipelineState) -> Result<(PipelineState, Next), PipelineError> {
        let doc = original_doc(&state, HISTORY_SUMMARY)?;
        let summary = complete_text(
            self.llm.as_ref(),
            &summary_system_prompt(self.max_sources),
            &summary_user_prompt(doc, &state.history_info),
        )
        .await?;
        tracing::info!(items = state.history_info.len(), chars = summary.len(), "history summary written");
        Ok((
            PipelineState {
                history_summary: Some(summary),
                ..PipelineState::default()
            },
            Next::Continue,
        ))
    }
}
