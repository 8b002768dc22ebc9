//! File-based logging for tunes-rs
//!
//! The terminal belongs to the TUI, so tracing output goes to a daily rolling
//! file instead of stdout.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "tunes-rs";
const DEFAULT_FILTER: &str = "tunes_rs=debug,reqwest=info,symphonia=warn,warn";

/// Initialize the logging system.
///
/// Logs are written to `<log_dir>/tunes-rs.YYYY-MM-DD`. `RUST_LOG` overrides
/// the default filter. The returned guard flushes pending lines when dropped,
/// so keep it alive until the end of `main`.
pub fn init_logging(config: &Config) -> anyhow::Result<WorkerGuard> {
    let log_dir = Path::new(&config.log_dir);
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(log_dir = %config.log_dir, "Logging initialized");

    Ok(guard)
}

/// Log the outcome of a catalog request
#[macro_export]
macro_rules! log_catalog_result {
    ($term:expr, $result:expr) => {
        match &$result {
            Ok(tracks) => tracing::info!(term = %$term, tracks = tracks.len(), "Catalog request successful"),
            Err(e) => tracing::error!(term = %$term, error = %e, "Catalog request failed"),
        }
    };
}
