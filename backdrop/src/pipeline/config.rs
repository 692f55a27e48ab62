//! Run parameters for the pipeline.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Explicit pipeline parameters. `Default` gives the stock run.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Upper bound on generated search queries (requested in the prompt, enforced by truncation).
    pub top_n_search_queries: usize,
    /// Links taken from the top of each query's results.
    pub top_n_search_results: usize,
    pub model: String,
    pub temperature: f32,
    /// Per-URL fetch timeout in the extraction stage.
    pub extract_timeout: Duration,
    pub search_category: String,
    /// Most history items the summary prompt asks the model to draw on.
    pub summary_max_sources: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_n_search_queries: 5,
            top_n_search_results: 5,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            extract_timeout: Duration::from_secs(15),
            search_category: "news".to_string(),
            summary_max_sources: 5,
        }
    }
}

fn parse_var<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })
}

impl PipelineConfig {
    /// Defaults overridden from `BACKDROP_*` env vars (`BACKDROP_MODEL` falls back to `OPENAI_MODEL`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();
        if let Some(v) = get("BACKDROP_TOP_N_QUERIES") {
            cfg.top_n_search_queries = parse_var("BACKDROP_TOP_N_QUERIES", v)?;
        }
        if let Some(v) = get("BACKDROP_TOP_N_RESULTS") {
            cfg.top_n_search_results = parse_var("BACKDROP_TOP_N_RESULTS", v)?;
        }
        if let Some(v) = get("BACKDROP_MODEL").or_else(|| get("OPENAI_MODEL")) {
            cfg.model = v.trim().to_string();
        }
        if let Some(v) = get("BACKDROP_TEMPERATURE") {
            let t: f32 = parse_var("BACKDROP_TEMPERATURE", v.clone())?;
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Invalid {
                    key: "BACKDROP_TEMPERATURE",
                    value: v,
                    reason: "must be between 0 and 2".to_string(),
                });
            }
            cfg.temperature = t;
        }
        if let Some(v) = get("BACKDROP_EXTRACT_TIMEOUT_SECS") {
            let secs: u64 = parse_var("BACKDROP_EXTRACT_TIMEOUT_SECS", v)?;
            cfg.extract_timeout = Duration::from_secs(secs);
        }
        Ok(cfg)
    }
}
