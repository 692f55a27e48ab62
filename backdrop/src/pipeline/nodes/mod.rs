//! The five stages of a run, each a graph [`Node`](crate::graph::Node) over
//! [`PipelineState`](super::PipelineState). Nodes return only the fields they write.

mod extract_node;
mod init_node;
mod query_node;
mod summary_node;
mod url_node;

pub use extract_node::ExtractNode;
pub use init_node::InitNode;
pub use query_node::QueryGenerationNode;
pub use summary_node::SummaryNode;
pub use url_node::UrlDiscoveryNode;

use crate::error::PipelineError;
use crate::fetch::Document;

use super::PipelineState;

pub const INIT: &str = "init";
pub const HISTORY_QUERIES: &str = "history_queries";
pub const HISTORY_URLS: &str = "history_urls";
pub const HISTORY_EXTRACT: &str = "history_extract";
pub const HISTORY_SUMMARY: &str = "history_summary";

/// The original document, or an error naming the stage that needed it.
fn original_doc<'a>(state: &'a PipelineState, node: &str) -> Result<&'a Document, PipelineError> {
    state.original_doc.as_ref().ok_or_else(|| {
        PipelineError::ExecutionFailed(format!("{}: original_doc not set", node))
    })
}
