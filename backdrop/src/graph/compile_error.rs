//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when edges reference unknown nodes, the chain
//! is malformed, or a fan-out edge has no single place to join.

use thiserror::Error;

/// Error when compiling a state graph (e.g. edge references unknown node, invalid chain).
#[derive(Debug, Error)]
pub enum CompilationError {
    /// A node id in an edge was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge has from_id == START.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// Nothing reaches END.
    #[error("graph must have an edge to END")]
    MissingEnd,

    /// Edges do not form a single chain (e.g. branch, cycle).
    #[error("edges must form a single linear chain from START to END: {0}")]
    InvalidChain(String),

    /// A node has more than one kind of outgoing edge (plain, conditional, fan-out).
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A value in a conditional path_map is not a valid node id or END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),

    /// A fan-out target is not a registered node.
    #[error("fan-out target not found: {0}")]
    InvalidFanOutTarget(String),

    /// Fan-out targets must all have one plain outgoing edge to the same node.
    #[error("fan-out from {0} has no single join node")]
    FanOutJoinMismatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of NodeNotFound contains "node not found" and the node id.
    #[test]
    fn compilation_error_display_node_not_found() {
        let s = CompilationError::NodeNotFound("x".to_string()).to_string();
        assert!(s.contains("node not found"), "{}", s);
        assert!(s.contains("x"), "{}", s);
    }

    /// **Scenario**: Display of MissingStart mentions START.
    #[test]
    fn compilation_error_display_missing_start() {
        let s = CompilationError::MissingStart.to_string();
        assert!(s.to_lowercase().contains("start"), "{}", s);
    }

    /// **Scenario**: Display of FanOutJoinMismatch names the source node.
    #[test]
    fn compilation_error_display_fan_out_join_mismatch() {
        let s = CompilationError::FanOutJoinMismatch("history_urls".to_string()).to_string();
        assert!(s.contains("history_urls"), "{}", s);
        assert!(s.contains("join"), "{}", s);
    }
}
