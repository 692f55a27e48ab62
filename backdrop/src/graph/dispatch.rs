//! Dispatch: one fan-out task addressed to a node, carrying that task's own input.

/// A single task produced by a fan-out router.
///
/// The compiled graph runs `node` with `arg` as its input state. The task never sees
/// the accumulated graph state; its output is folded into it by the graph's
/// `StateUpdater` once the task finishes.
#[derive(Debug, Clone)]
pub struct Dispatch<S> {
    /// Target node id; must be one of the targets declared in `add_fan_out`.
    pub node: String,
    /// Input state for this task only.
    pub arg: S,
}

impl<S> Dispatch<S> {
    pub fn new(node: impl Into<String>, arg: S) -> Self {
        Self {
            node: node.into(),
            arg,
        }
    }
}
