//! Pipeline error types.
//!
//! `PipelineError` is what a node returns and what `Orchestrator::run` surfaces.
//! Each collaborator has its own error enum (`FetchError`, `SearchError`, `LlmError`);
//! they convert into `PipelineError` so nodes can use `?` directly.

use thiserror::Error;

use crate::fetch::FetchError;
use crate::graph::CompilationError;
use crate::llm::LlmError;
use crate::search::SearchError;

/// Error from a graph node or from the pipeline as a whole.
///
/// Every variant is fatal for the run except where a node catches it itself
/// (the extraction fan-out task does, and contributes nothing instead).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Graph-level failure (e.g. empty graph, missing state the node depends on).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The pipeline graph did not compile.
    #[error("graph compilation failed: {0}")]
    Compilation(#[from] CompilationError),

    /// Document fetch failed.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Search request failed.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// Completion failed or returned output that does not match the schema.
    #[error("completion failed: {0}")]
    Llm(#[from] LlmError),
}
