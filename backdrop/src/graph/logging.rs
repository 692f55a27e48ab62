//! Structured logging for graph execution: graph start/complete/error, node
//! start/complete, state updates, fan-out dispatch and join.

use std::fmt::Debug;

/// Log node execution start.
pub fn log_node_start(node_id: &str) {
    tracing::debug!(node_id = node_id, "Starting node execution");
}

/// Log the input state of a node about to run.
pub fn log_node_state<S: Debug>(node_id: &str, state: &S) {
    tracing::trace!(node_id = node_id, state = ?state, "Node execution: state");
}

/// Log node execution completion.
pub fn log_node_complete(node_id: &str, next: &crate::graph::Next) {
    tracing::debug!(node_id = node_id, ?next, "Node execution complete");
}

/// Log state update after a node output was merged.
pub fn log_state_update(node_id: &str) {
    tracing::debug!(node_id = node_id, "State updated");
}

/// Log the tasks scheduled by a fan-out edge.
pub fn log_fan_out_dispatch(source: &str, tasks: usize) {
    tracing::info!(source = source, tasks = tasks, "Fan-out dispatch");
}

/// Log a drained fan-out and where the run continues.
pub fn log_fan_out_join(source: &str, tasks: usize, join: &str) {
    tracing::info!(source = source, tasks = tasks, join = join, "Fan-out joined");
}

/// Log graph execution start.
pub fn log_graph_start() {
    tracing::info!("Starting graph execution");
}

/// Log graph execution completion.
pub fn log_graph_complete() {
    tracing::info!("Graph execution complete");
}

/// Log graph execution error.
pub fn log_graph_error(error: &crate::error::PipelineError) {
    tracing::error!(%error, "Graph execution error");
}
