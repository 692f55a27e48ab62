//! Logging initialization: never on stdout, which carries only the run's output.
//!
//! - **RUST_LOG**: level filter, e.g. `info`, `backdrop=debug`. Default: `info`.
//! - **LOG_FILE** / `--log-file`: when set, logs are appended to that file as plain text;
//!   otherwise they go to stderr.

use std::path::Path;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_FILTER: &str = "info,hyper_util=off,reqwest=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Call once, before the run.
pub fn init(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_filter(env_filter());
            tracing_subscriber::registry().with(file_layer).try_init()?;
            tracing::info!(path = %path.display(), "backdrop logging to file");
        }
        None => {
            let stderr_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(env_filter());
            tracing_subscriber::registry().with(stderr_layer).try_init()?;
        }
    }
    Ok(())
}
