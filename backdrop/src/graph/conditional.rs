//! Routed edges: conditional (state → one next node) and fan-out (state → N tasks).
//!
//! **Interaction**: Used by `StateGraph::add_conditional_edges` / `add_fan_out` and by
//! the `CompiledStateGraph` run loop to resolve what runs after a routed node.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use super::Dispatch;

/// Router function: takes a reference to state and returns a routing key.
///
/// The key is used as the next node id when no path map is provided, or
/// looked up in the path map to get the next node id (or END).
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Fan-out router: turns the current state into a list of tasks, one per item
/// of a collection only known at run time. An empty list schedules nothing.
pub type FanOutRouterFn<S> = Arc<dyn Fn(&S) -> Vec<Dispatch<S>> + Send + Sync>;

/// Conditional edge definition: routing function plus optional path map.
///
/// - When `path_map` is `None`, the router's return value is used directly as the next node id.
/// - When `path_map` is `Some(map)`, the router's return value is used as the key;
///   the next node id is `map[key]` if present, otherwise the key itself.
#[derive(Clone)]
pub struct ConditionalRouter<S> {
    pub(super) path: ConditionalRouterFn<S>,
    pub(super) path_map: Option<HashMap<String, String>>,
}

impl<S> ConditionalRouter<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(path: ConditionalRouterFn<S>, path_map: Option<HashMap<String, String>>) -> Self {
        Self { path, path_map }
    }

    /// Resolves the next node id (or END) from the current state.
    pub fn resolve_next(&self, state: &S) -> String {
        let key = (self.path)(state);
        self.path_map
            .as_ref()
            .and_then(|m| m.get(&key))
            .cloned()
            .unwrap_or(key)
    }
}

/// Fan-out edge definition: router, the node ids tasks may target, and the join node.
///
/// `join` is filled in at compile time from the targets' shared outgoing edge; the run
/// continues there once every task has finished.
#[derive(Clone)]
pub struct FanOutRouter<S> {
    pub(super) route: FanOutRouterFn<S>,
    pub(super) targets: Vec<String>,
    pub(super) join: String,
}

impl<S> FanOutRouter<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(route: FanOutRouterFn<S>, targets: Vec<String>) -> Self {
        Self {
            route,
            targets,
            join: String::new(),
        }
    }

    /// Tasks to schedule for the current state.
    pub fn dispatches(&self, state: &S) -> Vec<Dispatch<S>> {
        (self.route)(state)
    }

    /// Node ids tasks may be addressed to.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Node (or END) the run continues with after the fan-out drains.
    pub fn join(&self) -> &str {
        &self.join
    }
}

/// How to determine the next node after a given node runs.
#[derive(Clone)]
pub enum NextEntry<S> {
    /// Single fixed next node (or END). The node's `Next` is still respected.
    Unconditional(String),
    /// Next node is decided by the router from state; the node's `Next` is ignored.
    Conditional(ConditionalRouter<S>),
    /// Run the routed tasks concurrently, fold their outputs, then continue at the join.
    FanOut(FanOutRouter<S>),
}
