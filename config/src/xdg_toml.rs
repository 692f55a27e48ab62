//! `[env]` table of `$XDG_CONFIG_HOME/<app>/config.toml`.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::LoadError;

/// Base config directory: `XDG_CONFIG_HOME` when set (on every platform), else the
/// platform default from `dirs`.
fn config_home() -> Result<PathBuf, LoadError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir().ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into()))
}

/// `<config home>/<app_name>/config.toml`, whether or not it exists.
pub fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    Ok(config_home()?.join(app_name).join("config.toml"))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, toml::Value>,
}

/// Renders scalar TOML values as env strings; tables and arrays are rejected.
fn env_value(key: &str, value: toml::Value) -> Result<String, LoadError> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        other => Err(LoadError::XdgValue {
            key: key.to_string(),
            kind: other.type_str(),
        }),
    }
}

/// Env pairs from the `[env]` table, plus the file they came from. A missing file
/// or section yields an empty map.
pub fn load_env_map(app_name: &str) -> Result<(HashMap<String, String>, Option<PathBuf>), LoadError> {
    let path = config_path(app_name)?;
    if !path.is_file() {
        return Ok((HashMap::new(), None));
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let file: ConfigFile = toml::from_str(&content)?;
    let mut map = HashMap::with_capacity(file.env.len());
    for (k, v) in file.env {
        let v = env_value(&k, v)?;
        map.insert(k, v);
    }
    Ok((map, Some(path)))
}
