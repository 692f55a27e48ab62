//! State graph: nodes, edges and one kind of dynamic fan-out; compile and invoke.
//!
//! Build a `StateGraph`, add nodes and edges, compile, then invoke with a state.
//! A fan-out edge (`StateGraph::add_fan_out`) turns the source node's output into
//! N independent tasks run concurrently; their outputs are folded back into the
//! state through the graph's `StateUpdater` before the run continues.

mod compile_error;
mod compiled;
mod conditional;
mod dispatch;
mod logging;
mod logging_middleware;
mod next;
mod node;
mod node_middleware;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, FanOutRouter, FanOutRouterFn, NextEntry};
pub use dispatch::Dispatch;
pub use logging::{
    log_fan_out_dispatch, log_fan_out_join, log_graph_complete, log_graph_error, log_graph_start,
    log_node_complete, log_node_start, log_node_state, log_state_update,
};
pub use logging_middleware::LoggingNodeMiddleware;
pub use next::Next;
pub use node::Node;
pub use node_middleware::{NodeFuture, NodeMiddleware, NodeRun};
pub use state_graph::{StateGraph, END, START};
