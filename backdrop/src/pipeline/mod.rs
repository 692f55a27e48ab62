//! The historical-context pipeline: state, stages, prompts and the orchestrator.

mod config;
pub mod nodes;
mod orchestrator;
pub mod prompts;
mod state;

#[cfg(test)]
pub(crate) mod fakes;

pub use config::{ConfigError, PipelineConfig};
pub use orchestrator::{build_graph, Collaborators, Orchestrator};
pub use state::{pipeline_updater, HistoryItem, PipelineState, SearchQueries};
