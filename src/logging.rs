//! Structured logging for wavecart using the tracing crate.
//!
//! Writes to daily-rotated log files under the XDG state directory and never
//! to the terminal, which would corrupt the storefront TUI. Old log files
//! are pruned at startup, keeping the 7 most recent days.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Keeps the non-blocking appender alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Days of rotated log files kept around.
const MAX_LOG_FILES: usize = 7;

/// Initializes the logging system with file-based output.
///
/// Log level is controlled by the RUST_LOG environment variable and defaults
/// to "info".
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> anyhow::Result<()> {
    let log_dir = log_dir()?;

    if let Err(e) = prune_old_logs(&log_dir) {
        eprintln!("Warning: Failed to prune old logs: {e}");
    }

    let file_appender = rolling::daily(&log_dir, "wavecart.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging initialized. Log directory: {}", log_dir.display());
    Ok(())
}

/// The log directory, following the XDG Base Directory Specification.
///
/// Prefers XDG_STATE_HOME when set, otherwise ~/.local/state/wavecart.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the log directory cannot be created
pub fn log_dir() -> anyhow::Result<PathBuf> {
    let log_dir = if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        PathBuf::from(xdg_state).join("wavecart")
    } else {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        home.join(".local/state/wavecart")
    };

    fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}

/// Removes rotated log files beyond the retention window.
///
/// Only files matching the `wavecart.log.YYYY-MM-DD` rotation pattern are
/// considered.
fn prune_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    let mut rotated: Vec<(PathBuf, std::time::SystemTime)> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_string_lossy().to_string();
            if !name.starts_with("wavecart.log.") {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .collect();

    // newest first, then drop everything past the window
    rotated.sort_by(|a, b| b.1.cmp(&a.1));
    for (path, _) in rotated.iter().skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            eprintln!("Warning: Failed to delete old log file {}: {e}", path.display());
        }
    }

    Ok(())
}
