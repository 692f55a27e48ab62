//! Backdrop CLI: argument parsing, collaborator wiring and output rendering.
//!
//! The binary (`src/main.rs`) loads config, installs logging and calls [`run`]; everything
//! that can be tested without network lives here.

pub mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use backdrop::{
    ChatOpenAI, Collaborators, ConfigError, FetchError, LoggingNodeMiddleware, Orchestrator,
    PipelineConfig, PipelineError, PipelineState, SearchError, SerperSearch, WebFetcher,
};
use clap::Parser;
use thiserror::Error;

/// Article explained when no URL is given.
pub const DEFAULT_SEED_URL: &str = "https://msutoday.msu.edu/news/2024/msu-new-plant-and-environmental-sciences-building-crtiical-to-advancing-climate-resilient-plants";

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "backdrop", version)]
#[command(about = "Backdrop: explain the historical context of a news article")]
pub struct Args {
    /// Article URL
    #[arg(value_name = "URL", default_value = DEFAULT_SEED_URL)]
    pub url: String,

    /// Chat model (default: BACKDROP_MODEL, then OPENAI_MODEL, then gpt-4o-mini)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Most search queries to generate
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub top_n_queries: Option<u16>,

    /// Links taken from the top of each query's results
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub top_n_results: Option<u16>,

    /// Verbose: log node enter/exit with timings
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the whole final state as JSON instead of the summary
    #[arg(long)]
    pub json: bool,

    /// With --json, pretty-print
    #[arg(long, requires = "json")]
    pub pretty: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "PATH", env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0} is not set")]
    MissingEnv(&'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("render output: {0}")]
    Render(#[from] serde_json::Error),
}

/// Env config with command-line overrides on top.
pub fn pipeline_config(args: &Args) -> Result<PipelineConfig, CliError> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(n) = args.top_n_queries {
        config.top_n_search_queries = n.into();
    }
    if let Some(n) = args.top_n_results {
        config.top_n_search_results = n.into();
    }
    Ok(config)
}

fn require_env(key: &'static str) -> Result<(), CliError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(CliError::MissingEnv(key)),
    }
}

/// Builds the real collaborators (HTTP fetcher, Serper, OpenAI) for `config`.
pub fn collaborators(config: &PipelineConfig) -> Result<Collaborators, CliError> {
    require_env("OPENAI_API_KEY")?;
    Ok(Collaborators {
        fetcher: Arc::new(WebFetcher::new()?),
        search: Arc::new(SerperSearch::from_env()?),
        llm: Arc::new(ChatOpenAI::new(config.model.clone()).with_temperature(config.temperature)),
    })
}

/// Runs the pipeline for `args.url`.
pub async fn run(args: &Args) -> Result<PipelineState, CliError> {
    let config = pipeline_config(args)?;
    tracing::debug!(?config, "pipeline config");
    let collab = collaborators(&config)?;
    let orchestrator = if args.verbose {
        Orchestrator::with_middleware(
            config,
            collab,
            Arc::new(LoggingNodeMiddleware::<PipelineState>::default()),
        )?
    } else {
        Orchestrator::new(config, collab)?
    };
    Ok(orchestrator.run(&args.url).await?)
}

/// Text printed to stdout: the summary, or the state as JSON.
pub fn render(state: &PipelineState, json: bool, pretty: bool) -> Result<String, CliError> {
    if !json {
        return Ok(state.history_summary.clone().unwrap_or_default());
    }
    Ok(if pretty {
        serde_json::to_string_pretty(state)?
    } else {
        serde_json::to_string(state)?
    })
}
