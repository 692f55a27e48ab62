//! Graph node trait: one step in a StateGraph.
//!
//! Receives state `S`, returns a state update and `Next` (continue, jump, or end).
//! What "update" means is up to the graph's `StateUpdater`: with the default
//! `ReplaceUpdater` it is the full new state; with a field-based updater a node
//! returns only the fields it wrote.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::PipelineError;

use super::Next;

/// One step in a graph: state in, (state update out, next step).
///
/// Fan-out tasks implement the same trait; they receive the `arg` of their
/// [`Dispatch`](super::Dispatch) instead of the accumulated state.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Node id (e.g. `"init"`, `"history_summary"`). Must be unique within a graph.
    fn id(&self) -> &str;

    /// One step: state in, (state update out, next step).
    async fn run(&self, state: S) -> Result<(S, Next), PipelineError>;
}
