//! State updater: merge semantics for node outputs.
//!
//! After every node (and every fan-out task) the compiled graph calls
//! [`StateUpdater::apply_update`] with the accumulated state and the node's output.
//! Two strategies are provided:
//!
//! - [`ReplaceUpdater`]: the output is the new state (default).
//! - [`FieldBasedUpdater`]: a closure decides per field, so nodes can return only
//!   what they wrote and list fields can be concatenated.
//!
//! Fan-out task outputs are folded in completion order, so any list merge an updater
//! performs must be associative and its consumers must not depend on item order.

use std::fmt::Debug;
use std::sync::Arc;

/// Merge strategy applied after each node run.
pub trait StateUpdater<S>: Send + Sync + Debug
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Merges `update` (a node's output) into `current`.
    fn apply_update(&self, current: &mut S, update: &S);
}

/// Replaces the whole state with the node's output.
#[derive(Debug, Clone, Default)]
pub struct ReplaceUpdater;

impl<S> StateUpdater<S> for ReplaceUpdater
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn apply_update(&self, current: &mut S, update: &S) {
        *current = update.clone();
    }
}

/// Merges with a user-supplied closure `(current, update)`.
///
/// ```rust,no_run
/// use backdrop::channels::FieldBasedUpdater;
///
/// #[derive(Clone, Debug)]
/// struct State { found: Vec<String>, title: Option<String> }
///
/// let updater = FieldBasedUpdater::new(|current: &mut State, update: &State| {
///     current.found.extend(update.found.iter().cloned());
///     if update.title.is_some() {
///         current.title = update.title.clone();
///     }
/// });
/// ```
pub struct FieldBasedUpdater<S, F>
where
    S: Clone + Send + Sync + Debug + 'static,
    F: Fn(&mut S, &S) + Send + Sync + 'static,
{
    updater_fn: F,
    _marker: std::marker::PhantomData<S>,
}

impl<S, F> Debug for FieldBasedUpdater<S, F>
where
    S: Clone + Send + Sync + Debug + 'static,
    F: Fn(&mut S, &S) + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBasedUpdater")
            .field("updater_fn", &"<function>")
            .finish()
    }
}

impl<S, F> FieldBasedUpdater<S, F>
where
    S: Clone + Send + Sync + Debug + 'static,
    F: Fn(&mut S, &S) + Send + Sync + 'static,
{
    pub fn new(updater_fn: F) -> Self {
        Self {
            updater_fn,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<S, F> StateUpdater<S> for FieldBasedUpdater<S, F>
where
    S: Clone + Send + Sync + Debug + 'static,
    F: Fn(&mut S, &S) + Send + Sync + 'static,
{
    fn apply_update(&self, current: &mut S, update: &S) {
        (self.updater_fn)(current, update);
    }
}

/// Shared, type-erased updater as stored by the graph.
pub type BoxedStateUpdater<S> = Arc<dyn StateUpdater<S>>;

/// Wraps an updater for `StateGraph::with_state_updater`.
pub fn boxed_updater<S, U>(updater: U) -> BoxedStateUpdater<S>
where
    S: Clone + Send + Sync + Debug + 'static,
    U: StateUpdater<S> + 'static,
{
    Arc::new(updater)
}
