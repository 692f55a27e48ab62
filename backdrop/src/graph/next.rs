//! Next-step result from a graph node: continue linear chain, jump to a node, or end.
//!
//! The graph runner uses this to decide the next node or to stop.

/// Next step after running a node.
///
/// - **Continue**: follow the outgoing edge (next node in chain, or END if last).
/// - **Node(id)**: jump to the given node.
/// - **End**: stop; return current state as final result.
///
/// Ignored after nodes with conditional or fan-out edges, and for fan-out tasks:
/// the graph decides where those go.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Follow the outgoing edge; if the current node is last, equivalent to End.
    Continue,
    /// Run the node with the given id next.
    Node(String),
    /// Stop and return the current state.
    End,
}
