// 📝 Progress Log - Timestamped milestone lines
//
// One line per lifecycle milestone, appended to a plain text file:
//   2026-Oct-17-09-:41:07: Extract Phase Started
//
// The file is never rotated or truncated. Every milestone is mirrored
// to tracing so it also shows up on the console.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `%h` is the abbreviated month; the stray `-` before `:%M` is part of the format
pub const TIMESTAMP_FORMAT: &str = "%Y-%h-%d-%H-:%M:%S";

// ============================================================================
// MILESTONES
// ============================================================================

pub const MSG_PRELIMINARIES: &str = "Preliminaries complete. Initiating ETL process";
pub const MSG_EXTRACT_STARTED: &str = "Extract Phase Started";
pub const MSG_EXTRACT_DONE: &str = "Data extraction complete. Initiating Transformation process";
pub const MSG_TRANSFORM_STARTED: &str = "Transformation Phase Started";
pub const MSG_TRANSFORM_DONE: &str = "Data transformation complete. Initiating Loading process";
pub const MSG_LOAD_STARTED: &str = "Load Phase Started";
pub const MSG_CSV_SAVED: &str = "Data saved to CSV file";
pub const MSG_SQL_CONNECTED: &str = "SQL Connection initiated";
pub const MSG_DB_LOADED: &str = "Data loaded to Database as a table, Executing queries";
pub const MSG_PROCESS_COMPLETE: &str = "Process Complete";
pub const MSG_CONNECTION_CLOSED: &str = "Server Connection closed";

// ============================================================================
// LOGGER
// ============================================================================

#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProgressLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `<timestamp>: <message>` to the log file (created if absent)
    pub fn log(&self, message: &str) -> Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open log file: {}", self.path.display()))?;

        writeln!(file, "{}: {}", timestamp, message)
            .with_context(|| format!("Failed to write log file: {}", self.path.display()))?;

        tracing::info!("{}", message);

        Ok(())
    }
}
