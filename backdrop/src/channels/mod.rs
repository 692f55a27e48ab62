//! How node outputs are merged into the running graph state.
//!
//! See [`StateUpdater`]; the default replaces the whole state, field-based updaters
//! merge per field (e.g. append to a list written by several fan-out tasks).

mod updater;

pub use updater::{boxed_updater, BoxedStateUpdater, FieldBasedUpdater, ReplaceUpdater, StateUpdater};
