//! Tracing setup for hosts embedding the client.
//!
//! Stdout always; a daily-rolling file under `LOG_DIR` when
//! `ENABLE_FILE_LOGS` is set. Hosts call [`init_tracing`] once at startup
//! and keep the returned guard until shutdown.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "elara.log";
const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info` or `elara_client=debug`
    pub filter: String,
    /// Directory for the rolling file; `None` disables file output
    pub file_dir: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_env(filter: &str) -> Self {
        let enabled = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let file_dir = enabled.then(|| {
            std::env::var("LOG_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
        });
        Self {
            filter: filter.to_string(),
            file_dir,
        }
    }
}

impl From<&Config> for LogSettings {
    fn from(config: &Config) -> Self {
        Self::from_env(&config.log_level)
    }
}

/// Flushes the file writer when dropped.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Install the global subscriber. Returns `None` when no file layer was
/// installed, including when another subscriber was already set.
pub fn init_tracing(settings: &LogSettings) -> Option<FileLogGuard> {
    let env_filter =
        EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> =
        vec![fmt::layer().with_target(true).boxed()];

    let guard = settings
        .file_dir
        .as_deref()
        .and_then(file_writer)
        .map(|(writer, guard)| {
            let file_layer = fmt::layer().with_writer(writer).with_ansi(false).with_target(true);
            layers.push(file_layer.boxed());
            guard
        });

    let installed = tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .is_ok();

    guard.filter(|_| installed).map(|guard| FileLogGuard { _guard: guard })
}

fn file_writer(dir: &Path) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        eprintln!("failed to create log directory {}: {err}", dir.display());
        return None;
    }
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}
