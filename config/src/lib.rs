//! Load configuration from XDG `config.toml` and project `.env`, then apply it to the process
//! environment with priority: **existing env > .env > XDG**.
//!
//! The XDG file keeps its values under an `[env]` table:
//!
//! ```toml
//! [env]
//! OPENAI_MODEL = "gpt-4o-mini"
//! BACKDROP_TOP_N_QUERIES = 5
//! ```

mod dotenv;
mod xdg_toml;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use xdg_toml::config_path;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("xdg [env] value for {key} must be a scalar, got {kind}")]
    XdgValue { key: String, kind: &'static str },
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// What [`load_and_apply`] read and which keys it set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Applied {
    pub xdg_path: Option<PathBuf>,
    pub dotenv_path: Option<PathBuf>,
    /// Keys set from `.env`, sorted.
    pub from_dotenv: Vec<String>,
    /// Keys set from the XDG `[env]` table, sorted.
    pub from_xdg: Vec<String>,
}

impl Applied {
    pub fn is_empty(&self) -> bool {
        self.from_dotenv.is_empty() && self.from_xdg.is_empty()
    }
}

/// Loads `$XDG_CONFIG_HOME/<app_name>/config.toml` and the project `.env`, then sets
/// environment variables only for keys that are **not** already set.
///
/// * `app_name`: e.g. `"backdrop"`.
/// * `override_dir`: if `Some`, look for `.env` in this directory instead of the current one.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Applied, LoadError> {
    let (xdg_map, xdg_path) = xdg_toml::load_env_map(app_name)?;
    let (dotenv_map, dotenv_path) =
        dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    let mut applied = Applied {
        xdg_path,
        dotenv_path,
        ..Applied::default()
    };
    let keys: HashSet<&String> = xdg_map.keys().chain(dotenv_map.keys()).collect();
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(v) = dotenv_map.get(key) {
            std::env::set_var(key, v);
            applied.from_dotenv.push(key.clone());
        } else if let Some(v) = xdg_map.get(key) {
            std::env::set_var(key, v);
            applied.from_xdg.push(key.clone());
        }
    }
    applied.from_dotenv.sort();
    applied.from_xdg.sort();
    tracing::debug!(
        xdg = ?applied.xdg_path,
        dotenv = ?applied.dotenv_path,
        from_dotenv = applied.from_dotenv.len(),
        from_xdg = applied.from_xdg.len(),
        "config applied"
    );
    Ok(applied)
}
