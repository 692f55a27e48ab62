//! Node middleware: wrap node.run with external async logic (around pattern).
//!
//! Set via `StateGraph::with_middleware`. Wraps every node run, fan-out tasks included.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt::Debug;

use crate::error::PipelineError;

use super::Next;

/// Future returned by a node run.
pub type NodeFuture<S> = BoxFuture<'static, Result<(S, Next), PipelineError>>;

/// The wrapped node run handed to middleware; must be called to execute the node.
pub type NodeRun<S> = Box<dyn FnOnce(S) -> NodeFuture<S> + Send>;

/// Async middleware that wraps node.run.
///
/// Can decide when to call `inner`, inspect or modify results, etc.
#[async_trait]
pub trait NodeMiddleware<S>: Send + Sync
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// - `node_id`: current node id
    /// - `state`: state passed to the node
    /// - `inner`: actual node.run logic
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeRun<S>,
    ) -> Result<(S, Next), PipelineError>;
}
