//! Backdrop CLI binary: print the historical context of one article.
//!
//! `backdrop [URL] [--model M] [--top-n-queries N] [--top-n-results N] [-v] [--json [--pretty]]`

use backdrop_cli::{logging, render, run, Args};
use clap::Parser;

#[tokio::main]
async fn main() {
    // Before parsing so `.env` / XDG values feed clap's env fallbacks (LOG_FILE).
    let applied = backdrop_config::load_and_apply("backdrop", None);
    let args = Args::parse();

    if let Err(e) = logging::init(args.log_file.as_deref()) {
        eprintln!("backdrop: logging: {}", e);
        std::process::exit(1);
    }
    match applied {
        Ok(a) => tracing::debug!(
            from_dotenv = ?a.from_dotenv,
            from_xdg = ?a.from_xdg,
            "config loaded"
        ),
        Err(e) => tracing::warn!(error = %e, "config not loaded"),
    }

    let output = match run(&args).await {
        Ok(state) => render(&state, args.json, args.pretty),
        Err(e) => Err(e),
    };
    match output {
        Ok(text) => println!("{}", text),
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("backdrop: {}", e);
            std::process::exit(1);
        }
    }
}
