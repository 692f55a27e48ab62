//! `.env` parsing. Values are only collected here; `lib` decides what gets applied.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `.env` in `override_dir`, else in the current directory, if it is a file.
pub fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match override_dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return raw[1..raw.len() - 1].replace("\\\"", "\"").replace("\\n", "\n");
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }
    // Unquoted: ` #` starts a trailing comment.
    match raw.find(" #") {
        Some(i) => raw[..i].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// `KEY=VALUE` lines; blank lines, `#` comments and lines without `=` are skipped.
/// An optional `export ` prefix is accepted. Later duplicates win.
pub fn parse(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (k, v) = line.split_once('=')?;
            let key = k.trim();
            (!key.is_empty()).then(|| (key.to_string(), unquote(v.trim())))
        })
        .collect()
}

/// Parsed `.env` plus its path. Missing file yields an empty map.
pub fn load_env_map(
    override_dir: Option<&Path>,
) -> std::io::Result<(HashMap<String, String>, Option<PathBuf>)> {
    let Some(path) = dotenv_path(override_dir) else {
        return Ok((HashMap::new(), None));
    };
    let content = std::fs::read_to_string(&path)?;
    Ok((parse(&content), Some(path)))
}
