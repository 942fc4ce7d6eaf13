//! # Logging Bootstrap
//!
//! One `tracing` subscriber with up to three sinks:
//!
//! - console, filtered by `RUST_LOG` when set, else by the configured
//!   console level;
//! - `ALL_LOG_FILE`, JSON lines at the configured file level;
//! - `ERROR_LOG_FILE`, JSON lines for errors only.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::{LogLevel, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Console filter: `RUST_LOG` wins, otherwise the configured level.
pub fn console_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.tracing_level().as_str().to_lowercase()))
}

/// Install the global subscriber.
pub fn init(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let mut layers: Vec<BoxedLayer> = vec![fmt::layer()
        .with_filter(console_filter(config.console_level))
        .boxed()];

    if let Some(path) = &config.all_log_file {
        layers.push(json_file_layer(
            path,
            LevelFilter::from_level(config.log_level.tracing_level()),
        )?);
    }
    if let Some(path) = &config.error_log_file {
        layers.push(json_file_layer(path, LevelFilter::ERROR)?);
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

fn json_file_layer(path: &Path, filter: LevelFilter) -> Result<BoxedLayer, TelemetryError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TelemetryError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .with_filter(filter)
        .boxed())
}
