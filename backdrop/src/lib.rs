//! # Backdrop
//!
//! Historical context for a web document. Given one URL, a run fetches the page, asks a
//! language model for search queries about what preceded its events, searches the web,
//! summarizes every related article in parallel and writes one consolidated
//! historical-context summary.
//!
//! The run is a five-node state graph with a single dynamic fan-out:
//!
//! `init → history_queries → history_urls → [history_extract]* → history_summary → END`
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`], [`Dispatch`]: build
//!   and run state graphs with unconditional, conditional and fan-out edges.
//! - [`channels`]: [`StateUpdater`], [`FieldBasedUpdater`]: how node outputs merge into state.
//! - [`pipeline`]: [`PipelineState`], [`PipelineConfig`], [`Orchestrator`] and the five nodes.
//! - [`fetch`]: [`DocumentFetcher`], [`Document`], [`WebFetcher`].
//! - [`search`]: [`SearchProvider`], [`SearchResult`], [`SerperSearch`].
//! - [`llm`]: [`CompletionService`], [`OutputSchema`], [`ChatOpenAI`], [`MockLlm`].
//! - [`error`]: [`PipelineError`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use backdrop::{ChatOpenAI, Collaborators, Orchestrator, PipelineConfig, SerperSearch, WebFetcher};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_env()?;
//! let collab = Collaborators {
//!     fetcher: Arc::new(WebFetcher::new()?),
//!     search: Arc::new(SerperSearch::from_env()?),
//!     llm: Arc::new(ChatOpenAI::new(config.model.clone()).with_temperature(config.temperature)),
//! };
//! let state = Orchestrator::new(config, collab)?
//!     .run("https://example.com/article")
//!     .await?;
//! println!("{}", state.history_summary.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod llm;
pub mod pipeline;
pub mod search;

pub use channels::{boxed_updater, BoxedStateUpdater, FieldBasedUpdater, ReplaceUpdater, StateUpdater};
pub use error::PipelineError;
pub use fetch::{Document, DocumentFetcher, DocumentMetadata, FetchError, FetchOptions, WebFetcher};
pub use graph::{
    CompilationError, CompiledStateGraph, Dispatch, LoggingNodeMiddleware, Next, Node,
    NodeMiddleware, StateGraph, END, START,
};
pub use llm::{
    complete_structured, complete_text, ChatOpenAI, Completion, CompletionService, LlmError,
    MockLlm, OutputSchema, StructuredOutput,
};
pub use pipeline::{
    Collaborators, ConfigError, HistoryItem, Orchestrator, PipelineConfig, PipelineState,
    SearchQueries,
};
pub use search::{SearchError, SearchProvider, SearchResult, SerperSearch};
