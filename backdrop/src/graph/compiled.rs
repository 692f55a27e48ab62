//! Compiled state graph: immutable, supports invoke only.
//!
//! Built by `StateGraph::compile`. Holds nodes, the routing map derived from the
//! edges at compile time, optional middleware and the state updater.
//!
//! Fan-out tasks run on the tokio runtime through a `JoinSet`; each task owns its
//! input and returns its output, which the run loop folds into the state in
//! completion order. The loop only moves past the fan-out once the set is drained.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::Instrument;

use crate::channels::BoxedStateUpdater;
use crate::error::PipelineError;

use super::logging::{
    log_fan_out_dispatch, log_fan_out_join, log_graph_complete, log_graph_error,
    log_graph_start, log_node_complete, log_node_start, log_node_state, log_state_update,
};
use super::node_middleware::{NodeFuture, NodeMiddleware};
use super::state_graph::END;
use super::{Dispatch, FanOutRouter, Next, NextEntry, Node};

/// Compiled graph: immutable structure, supports invoke only.
///
/// Runs from the first node; after each node uses its outgoing edge, its conditional
/// router, or its fan-out router to choose what runs next.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// First node to run (from START).
    pub(super) first_node_id: String,
    /// Map from node id to how to get next. Nodes without an entry end the run.
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    /// Controls how node outputs (and fan-out task outputs) are merged into state.
    pub(super) state_updater: BoxedStateUpdater<S>,
}

/// Runs one node, through the middleware when present.
async fn execute_node<S>(
    node: Arc<dyn Node<S>>,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    state: S,
) -> Result<(S, Next), PipelineError>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    match middleware {
        Some(middleware) => {
            let node_id = node.id().to_string();
            middleware
                .around_run(
                    &node_id,
                    state,
                    Box::new(move |s: S| -> NodeFuture<S> {
                        Box::pin(async move { node.run(s).await })
                    }),
                )
                .await
        }
        None => node.run(state).await,
    }
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn node(&self, id: &str) -> Result<Arc<dyn Node<S>>, PipelineError> {
        self.nodes
            .get(id)
            .cloned()
            .ok_or_else(|| PipelineError::ExecutionFailed(format!("node not found: {}", id)))
    }

    /// Runs every task of a fan-out concurrently and folds each output into `state`.
    ///
    /// Returns the number of tasks that ran. The first task error aborts the run; tasks
    /// still pending are cancelled when the set is dropped.
    async fn run_fan_out(
        &self,
        source: &str,
        fan: &FanOutRouter<S>,
        state: &mut S,
    ) -> Result<usize, PipelineError> {
        let dispatches: Vec<Dispatch<S>> = fan.dispatches(state);
        let total = dispatches.len();
        log_fan_out_dispatch(source, total);

        let mut tasks = JoinSet::new();
        for dispatch in dispatches {
            if !fan.targets().iter().any(|t| *t == dispatch.node) {
                return Err(PipelineError::ExecutionFailed(format!(
                    "fan-out from {} dispatched to undeclared node {}",
                    source, dispatch.node
                )));
            }
            let node = self.node(&dispatch.node)?;
            let middleware = self.middleware.clone();
            let node_id = dispatch.node;
            log_node_start(&node_id);
            tasks.spawn(
                async move {
                    let result = execute_node(node, middleware, dispatch.arg).await;
                    (node_id, result)
                }
                .in_current_span(),
            );
        }

        while let Some(joined) = tasks.join_next().await {
            let (node_id, result) = joined.map_err(|e| {
                PipelineError::ExecutionFailed(format!("fan-out task from {} failed: {}", source, e))
            })?;
            let (update, next) = result?;
            log_node_complete(&node_id, &next);
            self.state_updater.apply_update(state, &update);
            log_state_update(&node_id);
        }

        log_fan_out_join(source, total, fan.join());
        Ok(total)
    }

    async fn run_loop(&self, state: &mut S) -> Result<(), PipelineError> {
        let mut current_id = self.first_node_id.clone();
        loop {
            let node = self.node(&current_id)?;

            log_node_start(&current_id);
            log_node_state(&current_id, state);

            let (update, next) =
                execute_node(node, self.middleware.clone(), state.clone()).await?;

            log_node_complete(&current_id, &next);
            self.state_updater.apply_update(state, &update);
            log_state_update(&current_id);

            let next_id = match self.next_map.get(&current_id) {
                Some(NextEntry::Conditional(router)) => {
                    let target = router.resolve_next(state);
                    tracing::debug!(from = %current_id, to = %target, "conditional routing");
                    Some(target)
                }
                Some(NextEntry::FanOut(fan)) => {
                    self.run_fan_out(&current_id, fan, state).await?;
                    Some(fan.join().to_string())
                }
                Some(NextEntry::Unconditional(to)) => match next {
                    Next::End => None,
                    Next::Node(id) => Some(id),
                    Next::Continue => Some(to.clone()),
                },
                None => match next {
                    Next::Node(id) => Some(id),
                    Next::Continue | Next::End => None,
                },
            };

            match next_id {
                Some(id) if id != END => current_id = id,
                _ => return Ok(()),
            }
        }
    }

    /// Runs the graph with the given state and returns the final state.
    ///
    /// - `Next::Continue`: follow the outgoing edge, or end if there is none.
    /// - `Next::Node(id)`: run the node with that id next.
    /// - `Next::End`: stop and return current state.
    pub async fn invoke(&self, state: S) -> Result<S, PipelineError> {
        if self.nodes.is_empty() || !self.nodes.contains_key(&self.first_node_id) {
            return Err(PipelineError::ExecutionFailed("empty graph".into()));
        }
        let mut state = state;
        log_graph_start();
        match self.run_loop(&mut state).await {
            Ok(()) => {
                log_graph_complete();
                Ok(state)
            }
            Err(e) => {
                log_graph_error(&e);
                Err(e)
            }
        }
    }
}
