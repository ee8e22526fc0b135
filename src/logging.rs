use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to install subscriber: {0}")]
    InitError(String),
}

/// Send tracing output to `log_path` (appending). The terminal belongs to the UI,
/// so nothing is written to stdout/stderr.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init(log_path: &Path, default_filter: &str) -> Result<(), LoggingError> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| LoggingError::InitError(e.to_string()))
}
