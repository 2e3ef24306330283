//! Logging setup.
//!
//! The terminal is owned by the viewer while it runs, so events go to a log
//! file rather than the console. `RUST_LOG` overrides the configured level.

use anyhow::{anyhow, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

const FALLBACK_FILE_NAME: &str = "wf3d.log";

/// Installs the global subscriber. Call once, before the terminal is taken over.
pub fn init_logger(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()));

    let (directory, file_name) = split_log_path(&config.file);
    let file_appender = RollingFileAppender::new(Rotation::NEVER, directory, file_name);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(false)
        .with_writer(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))
}

fn split_log_path(path: &Path) -> (&Path, &str) {
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(FALLBACK_FILE_NAME);
    (directory, file_name)
}
