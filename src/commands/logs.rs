//! Display recent log entries from the application.

use crate::logging;
use anyhow::anyhow;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_LINES: usize = 50;

/// Shows the most recent entries from the latest log file.
///
/// # Errors
/// - If the log directory cannot be determined
/// - If log files cannot be read
pub fn handle_logs() -> Result<(), anyhow::Error> {
    let log_dir = logging::log_dir()?;

    let log_file = match find_latest_log(&log_dir) {
        Some(path) => path,
        None => {
            println!("No log files found in: {}", log_dir.display());
            println!("Run 'wavecart' to generate logs.");
            return Ok(());
        }
    };

    let content = fs::read_to_string(&log_file)
        .map_err(|e| anyhow!("Failed to read log file: {e}"))?;

    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let lines: Vec<&str> = content.lines().collect();
    let start_index = lines.len().saturating_sub(DEFAULT_LINES);

    println!();
    if start_index > 0 {
        println!("Showing last {} of {} lines:", DEFAULT_LINES, lines.len());
    } else {
        println!("Showing all {} lines:", lines.len());
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in &lines[start_index..] {
        println!("{line}");
    }

    Ok(())
}

/// Finds the most recently modified log file in the directory.
fn find_latest_log(log_dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(log_dir).ok()?;

    let mut latest: Option<(PathBuf, std::time::SystemTime)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains("wavecart.log"));
        if !is_log {
            continue;
        }
        if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
            if latest.as_ref().is_none_or(|(_, t)| modified > *t) {
                latest = Some((path, modified));
            }
        }
    }

    latest.map(|(path, _)| path)
}
