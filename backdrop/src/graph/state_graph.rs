//! State graph: nodes + explicit edges (from → to), optional conditional edges and
//! fan-out edges.
//!
//! Add nodes with `add_node`, define the chain with `add_edge(from, to)` using
//! `START` and `END` for graph entry/exit. Use `add_conditional_edges` to route
//! to the next node based on state, or `add_fan_out` to turn state into N tasks
//! run concurrently. Then `compile` to get a `CompiledStateGraph`.
//!
//! # Fan-out
//!
//! After the source node runs, the router maps the state to a list of
//! [`Dispatch`](super::Dispatch) tasks. Each task runs its target node with its own
//! input. All declared targets must have one plain outgoing edge to the same node;
//! the run continues there once every task finished.
//!
//! # State Updates
//!
//! By default, nodes return a new state that completely replaces the previous state.
//! Use `with_state_updater` to merge node outputs field by field instead (required
//! for fan-out, where several task outputs are folded into one state).

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::channels::{BoxedStateUpdater, ReplaceUpdater};
use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::conditional::{
    ConditionalRouter, ConditionalRouterFn, FanOutRouter, FanOutRouterFn, NextEntry,
};
use crate::graph::node::Node;
use crate::graph::node_middleware::NodeMiddleware;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)`.
pub const END: &str = "__end__";

/// State graph: nodes plus explicit edges, conditional edges and fan-out edges.
///
/// Generic over state type `S`. Build with `add_node` / `add_edge(from, to)`, then
/// `compile()` to obtain an executable graph.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Edges (from_id, to_id).
    edges: Vec<(String, String)>,
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
    fan_outs: HashMap<String, FanOutRouter<S>>,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    /// Default is `ReplaceUpdater` which fully replaces the state.
    state_updater: Option<BoxedStateUpdater<S>>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            fan_outs: HashMap::new(),
            middleware: None,
            state_updater: None,
        }
    }

    /// Attaches node middleware; every node run (fan-out tasks included) goes through it.
    pub fn with_middleware(self, middleware: Arc<dyn NodeMiddleware<S>>) -> Self {
        Self {
            middleware: Some(middleware),
            ..self
        }
    }

    /// Attaches a custom state updater to the graph.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use backdrop::graph::StateGraph;
    /// use backdrop::channels::FieldBasedUpdater;
    /// use std::sync::Arc;
    ///
    /// #[derive(Clone, Debug)]
    /// struct MyState { items: Vec<String>, label: Option<String> }
    ///
    /// let updater = FieldBasedUpdater::new(|current: &mut MyState, update: &MyState| {
    ///     current.items.extend(update.items.iter().cloned());
    ///     if update.label.is_some() {
    ///         current.label = update.label.clone();
    ///     }
    /// });
    ///
    /// let graph = StateGraph::<MyState>::new()
    ///     .with_state_updater(Arc::new(updater));
    /// ```
    pub fn with_state_updater(self, updater: BoxedStateUpdater<S>) -> Self {
        Self {
            state_updater: Some(updater),
            ..self
        }
    }

    /// Adds a node; replaces any node with the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an edge from `from_id` to `to_id`. Use `START` and `END` for entry/exit.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds conditional edges from `source`: next node is determined by `path(state)`.
    ///
    /// When `path_map` is `Some(map)`, the return value of `path` is a key into it;
    /// otherwise it is the next node id (or END).
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    /// Adds a fan-out edge from `source`: after it runs, `route(state)` yields the tasks.
    ///
    /// `targets` lists every node id a task may be addressed to.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// graph.add_fan_out(
    ///     "history_urls",
    ///     Arc::new(|s: &PipelineState| {
    ///         s.urls().iter().map(|u| Dispatch::new("history_extract", PipelineState::seed(u.clone()))).collect()
    ///     }),
    ///     ["history_extract"],
    /// );
    /// graph.add_edge("history_extract", "history_summary");
    /// ```
    pub fn add_fan_out<I, T>(
        &mut self,
        source: impl Into<String>,
        route: FanOutRouterFn<S>,
        targets: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let targets = targets.into_iter().map(Into::into).collect();
        self.fan_outs
            .insert(source.into(), FanOutRouter::new(route, targets));
        self
    }

    /// Builds the executable graph: validates edges, routers and fan-out joins.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if let Some(ref path_map) = router.path_map {
                for target in path_map.values() {
                    if target != END && !self.nodes.contains_key(target) {
                        return Err(CompilationError::InvalidConditionalPathMap(target.clone()));
                    }
                }
            }
        }
        for (source, fan) in &self.fan_outs {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if self.conditional_edges.contains_key(source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(source.clone()));
            }
            for target in &fan.targets {
                if !self.nodes.contains_key(target) {
                    return Err(CompilationError::InvalidFanOutTarget(target.clone()));
                }
            }
        }

        let mut start_edges = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t.clone());
        let first = match (start_edges.next(), start_edges.next()) {
            (None, _) => return Err(CompilationError::MissingStart),
            (Some(first), None) => first,
            (Some(_), Some(_)) => {
                return Err(CompilationError::InvalidChain(
                    "multiple edges from START (branch)".into(),
                ))
            }
        };

        let has_end = self.edges.iter().any(|(_, t)| t == END)
            || self.conditional_edges.values().any(|r| {
                r.path_map
                    .as_ref()
                    .map_or(true, |m| m.values().any(|v| v == END))
            });
        if !has_end {
            return Err(CompilationError::MissingEnd);
        }

        let plain_edges: Vec<&(String, String)> =
            self.edges.iter().filter(|(f, _)| f.as_str() != START).collect();
        let edge_froms: HashSet<&String> = plain_edges.iter().map(|(f, _)| f).collect();
        if edge_froms.len() != plain_edges.len() {
            return Err(CompilationError::InvalidChain(
                "duplicate from (branch)".into(),
            ));
        }
        for source in self.conditional_edges.keys().chain(self.fan_outs.keys()) {
            if edge_froms.contains(source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(
                    source.clone(),
                ));
            }
        }

        let linear_next: HashMap<String, String> = plain_edges
            .iter()
            .map(|(f, t)| (f.clone(), t.clone()))
            .collect();

        let mut fan_outs = self.fan_outs;
        for (source, fan) in fan_outs.iter_mut() {
            let joins: HashSet<&String> = fan
                .targets
                .iter()
                .filter_map(|t| linear_next.get(t))
                .collect();
            let all_joined = fan.targets.iter().all(|t| linear_next.contains_key(t));
            match (all_joined, joins.len()) {
                (true, 1) => {
                    fan.join = joins.into_iter().next().cloned().unwrap_or_default();
                }
                _ => return Err(CompilationError::FanOutJoinMismatch(source.clone())),
            }
        }

        let mut next_map: HashMap<String, NextEntry<S>> = linear_next
            .iter()
            .map(|(f, t)| (f.clone(), NextEntry::Unconditional(t.clone())))
            .collect();
        for (source, router) in self.conditional_edges.iter() {
            next_map.insert(source.clone(), NextEntry::Conditional(router.clone()));
        }
        let routed = !self.conditional_edges.is_empty() || !fan_outs.is_empty();
        for (source, fan) in fan_outs {
            next_map.insert(source, NextEntry::FanOut(fan));
        }

        if !routed {
            let mut current = first.clone();
            let mut visited = HashSet::new();
            visited.insert(current.clone());
            while let Some(next) = linear_next.get(&current) {
                if next == END {
                    break;
                }
                if !visited.insert(next.clone()) {
                    return Err(CompilationError::InvalidChain("cycle detected".into()));
                }
                current = next.clone();
            }
        }

        let state_updater = self
            .state_updater
            .unwrap_or_else(|| Arc::new(ReplaceUpdater));

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            first_node_id: first,
            next_map,
            middleware: self.middleware,
            state_updater,
        })
    }
}
