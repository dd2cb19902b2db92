//! Subscriber setup: stderr plus an optional size-rotated log file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LogsConfig};

/// Install the global subscriber.
///
/// `RUST_LOG` wins; otherwise `verbose` selects debug output for our crates,
/// otherwise the configured level applies.
pub fn init_logging(config: &Config, verbose: bool) -> Result<()> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "trailer_technician=debug,trailer_av=debug,trailer_common=debug".to_string()
        } else {
            config.logs.level.as_str().to_string()
        }
    });

    let file_layer = match &config.logs.file {
        Some(path) => Some(
            fmt::layer()
                .with_writer(rotating_writer(path, &config.logs)?)
                .with_ansi(false)
                .with_target(true),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(env_filter))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

/// Log file writer that rolls over at `logs.max_bytes`, keeping `logs.backups`
/// numbered copies (`file.1` newest).
pub fn rotating_writer(path: &Path, logs: &LogsConfig) -> Result<Mutex<FileRotate<AppendCount>>> {
    // FileRotate swallows open errors; report an unusable path up front.
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let writer = FileRotate::new(
        path,
        AppendCount::new(logs.backups),
        ContentLimit::Bytes(logs.max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Mutex::new(writer))
}
