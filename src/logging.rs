//! Logging Module
//!
//! Daily-rotated log file in the local data directory, plus console output in
//! debug builds. When the log file cannot be opened the dashboard still logs,
//! to stderr only.

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_PREFIX: &str = "connect-dashboard";
const KEEP_LOG_FILES: usize = 7;

/// Initialize logging. Returns the file logging error, if the log file could
/// not be opened; it has already been reported through the console.
pub fn init() -> Option<String> {
    let log_dir = get_log_directory();

    let (file_layer, file_error) = match open_log_file(&log_dir) {
        Ok(appender) => {
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(appender);
            (Some(layer), None)
        }
        Err(e) => (None, Some(e)),
    };

    let console_layer = (cfg!(debug_assertions) || file_error.is_some())
        .then(|| fmt::layer().with_target(true).with_writer(std::io::stderr));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .is_ok();

    if let Some(e) = &file_error {
        if installed {
            tracing::warn!("File logging disabled ({}): {}", log_dir.display(), e);
        } else {
            eprintln!("File logging disabled ({}): {}", log_dir.display(), e);
        }
    }

    file_error
}

fn open_log_file(log_dir: &Path) -> Result<RollingFileAppender, String> {
    std::fs::create_dir_all(log_dir).map_err(|e| format!("creating log directory: {}", e))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .max_log_files(KEEP_LOG_FILES)
        .build(log_dir)
        .map_err(|e| format!("opening log file: {}", e))
}

fn default_filter() -> EnvFilter {
    let level = if cfg!(debug_assertions) { "debug" } else { "info" };
    EnvFilter::new(format!("{},hyper=warn,hyper_util=warn,reqwest=warn", level))
}

fn get_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ConnectDashboard")
        .join("logs")
}
