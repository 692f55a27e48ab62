//! Logging middleware: node enter/exit events around each node.run call.
//!
//! Used by the CLI `--verbose` flag. Interacts with [`NodeMiddleware`](super::NodeMiddleware).

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Instant;

use crate::error::PipelineError;
use crate::graph::Next;

use super::{NodeMiddleware, NodeRun};

/// Middleware that logs node enter/exit (with elapsed time) around each node.run call.
///
/// Generic over state type `S`; only node_id, next step and errors are logged.
pub struct LoggingNodeMiddleware<S> {
    _phantom: std::marker::PhantomData<S>,
}

impl<S> Default for LoggingNodeMiddleware<S> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<S> NodeMiddleware<S> for LoggingNodeMiddleware<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeRun<S>,
    ) -> Result<(S, Next), PipelineError> {
        tracing::info!(node = node_id, "enter node");
        let started = Instant::now();
        let result = inner(state).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok((_, next)) => tracing::info!(node = node_id, ?next, elapsed_ms, "exit node"),
            Err(e) => tracing::warn!(node = node_id, error = %e, elapsed_ms, "exit node with error"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeFuture;

    /// **Scenario**: Middleware runs the inner node and returns its result unchanged.
    #[tokio::test]
    async fn logging_middleware_passes_result_through() {
        let mw = LoggingNodeMiddleware::<i32>::default();
        let out = mw
            .around_run(
                "double",
                21,
                Box::new(|s: i32| -> NodeFuture<i32> {
                    Box::pin(async move { Ok((s * 2, Next::Continue)) })
                }),
            )
            .await
            .unwrap();
        assert_eq!(out, (42, Next::Continue));
    }

    /// **Scenario**: Errors from the inner node propagate.
    #[tokio::test]
    async fn logging_middleware_propagates_error() {
        let mw = LoggingNodeMiddleware::<i32>::default();
        let out = mw
            .around_run(
                "boom",
                0,
                Box::new(|_: i32| -> NodeFuture<i32> {
                    Box::pin(async { Err(PipelineError::ExecutionFailed("boom".into())) })
                }),
            )
            .await;
        assert!(matches!(out, Err(PipelineError::ExecutionFailed(_))));
    }
}
