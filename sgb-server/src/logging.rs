//! Session logging
//!
//! Events go to stderr and, when a logs directory is given, to a per-session
//! file named after the start time.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding a filter directive, e.g. `SGB_LOG=sgb_server=trace`
pub const LOG_ENV: &str = "SGB_LOG";

/// File name for a session started now: `YYYY-MM-DD_HH-MM-SS.log`
pub fn session_log_name() -> String {
    format!("{}.log", chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"))
}

/// Install the global subscriber
///
/// Returns the session log file path when one could be created. A file that
/// cannot be created only costs the file output; stderr logging still works.
pub fn init_logging(verbose: bool, logs_dir: Option<&Path>) -> Option<PathBuf> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let (file_layer, log_path, file_error) = match logs_dir.map(open_session_log) {
        Some(Ok((file, path))) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            ),
            Some(path),
            None,
        ),
        Some(Err(e)) => (None, None, Some(e)),
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!("Session log file unavailable, logging to stderr only: {}", e);
    }
    if let Some(path) = &log_path {
        tracing::debug!("Logging session to {}", path.display());
    }
    log_path
}

fn open_session_log(dir: &Path) -> std::io::Result<(File, PathBuf)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(session_log_name());
    let file = File::options().create(true).append(true).open(&path)?;
    Ok((file, path))
}
