//! metrology-catalog
//!
//! Loads a registry config, pre-registers the declared instruments and
//! prints the resulting catalog (keys, kinds, tags) as JSON.
//!
//! Usage: `metrology-catalog [path]` (default `metrology.yaml`).

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use metrology_core::Result;
use metrology_registry::{config, Registry};

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "metrology.yaml".into());
    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(path = %path, code = e.code().as_str(), error = %e, "catalog failed");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> Result<()> {
    let cfg = config::load_from_file(path)?;
    let registry = Registry::from_config(&cfg)?;
    tracing::info!(path = %path, instruments = registry.len(), "registry loaded");

    let body = serde_json::to_string_pretty(&registry.catalog())
        .map_err(|e| metrology_core::MetrologyError::Internal(format!("json encode failed: {e}")))?;
    println!("{body}");

    registry.stop();
    Ok(())
}
