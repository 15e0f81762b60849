//! Logger setup.
//!
//! Raw mode owns the display, so records go to `CRT_TERM_LOG_FILE` when it is set. Without it
//! they go to stderr, which suits tests and piped runs.

use std::fs::OpenOptions;

use crate::config::EnvConfig;

const DEFAULT_FILTER: &str = "info";

/// Install the global logger. Later calls, or a logger installed elsewhere, are left alone.
pub fn init(config: &EnvConfig) {
    let filter = config.log_filter.as_deref().unwrap_or(DEFAULT_FILTER);
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(filter).format_timestamp_micros();

    if let Some(path) = config.log_file.as_deref() {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(err) => eprintln!("crt_term: cannot open log file {path}: {err}"),
        }
    }

    // Fails only when a logger is already installed.
    let _ = builder.try_init();
}
