//! Tracing subscriber bootstrap.
//!
//! Logs always go to stderr. When a log directory is configured they are
//! also written, without ANSI colors, to `skill-sim.log` in that directory
//! through a non-blocking appender.
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::api::{Result, RuntimeError};
use crate::config::RuntimeConfig;

const LOG_FILE: &str = "skill-sim.log";

/// Keeps the file writer alive. Dropping it flushes and stops file logging.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured
/// filter.
pub fn init_logging(config: &RuntimeConfig) -> Result<LoggingGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(RuntimeError::LogDirectory)?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(RuntimeError::LoggingInstalled)?;

    if let Some(dir) = &config.log_dir {
        tracing::info!(path = %dir.join(LOG_FILE).display(), "file logging enabled");
    }
    Ok(LoggingGuard { _file: guard })
}
