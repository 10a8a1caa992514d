use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LOG_FILTER: &str = "info,reqwest=warn,hyper=warn";

const LOG_FILE_PREFIX: &str = "apkshelf";
const MAX_LOG_FILES: usize = 10;

fn file_appender(logs_dir: &Path) -> Result<RollingFileAppender> {
    fs_err::create_dir_all(logs_dir).context("Failed to create logs directory")?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(logs_dir)
        .context("Failed to initialize file appender")
}

/// Installs the global subscriber: console on stderr plus a daily rolling file in `logs_dir`.
///
/// `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`]. Keep the returned guard alive
/// for as long as file logs should be flushed.
pub fn setup_logging(logs_dir: &Path) -> Result<WorkerGuard> {
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(logs_dir)?);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .context("Failed to set global subscriber")?;

    Ok(guard)
}
