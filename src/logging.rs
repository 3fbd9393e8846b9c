//! Console and per-run log file output.

use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable overriding the configured log filter.
pub const LOG_ENV: &str = "CLIPNEST_LOG";

/// Keeps logging active; dropping it flushes the log file and removes the subscriber.
pub struct LogGuard {
    _file: WorkerGuard,
    _subscriber: DefaultGuard,
    path: PathBuf,
}

impl LogGuard {
    /// Location of this run's log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Name of the log file for a run started now.
pub fn log_file_name() -> String {
    format!("clipnest_{}.log", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Sends log lines to stdout and to a timestamped file in `directory`.
///
/// `level` is used unless `CLIPNEST_LOG` is set.
pub fn init_logging(directory: &Path, level: &str) -> io::Result<LogGuard> {
    let file_name = log_file_name();
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(&file_name)
        .build(directory)
        .map_err(|e| io::Error::other(e.to_string()))?;
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber_guard = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stdout)
                .with_target(false)
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(false)
                .with_ansi(false),
        )
        .with(filter)
        .set_default();

    Ok(LogGuard {
        _file: file_guard,
        _subscriber: subscriber_guard,
        path: directory.join(file_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name_format() {
        let name = log_file_name();
        assert!(name.starts_with("clipnest_"));
        assert!(name.ends_with(".log"));
        // clipnest_YYYYmmdd_HHMMSS.log
        assert_eq!(name.len(), "clipnest_".len() + 15 + ".log".len());
    }

    #[test]
    fn test_init_logging_writes_file() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = {
            let guard = init_logging(temp_dir.path(), "info").expect("Failed to init logging");
            tracing::info!("hello from test");
            guard.path().to_path_buf()
        };

        let contents = std::fs::read_to_string(&path).expect("Log file missing");
        assert!(contents.contains("INFO"));
        assert!(contents.contains("hello from test"));
    }
}
