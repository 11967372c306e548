// ⚙️ ETL Configuration
// Every path, the source URL and the table name in one place.
// Passed explicitly to the pipeline; nothing is read from globals.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Archived snapshot of the Wikipedia "largest banks" list
pub const DEFAULT_SOURCE_URL: &str =
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";

pub const DEFAULT_RATE_FILE: &str = "./exchange_rate.csv";
pub const DEFAULT_CSV_PATH: &str = "./Largest_banks_data.csv";
pub const DEFAULT_DB_PATH: &str = "./Banks.db";
pub const DEFAULT_TABLE_NAME: &str = "Largest_banks";
pub const DEFAULT_LOG_PATH: &str = "./code_log.txt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Page to scrape
    pub source_url: String,

    /// Two-column CSV: currency code, multiplier from USD
    pub rate_file: PathBuf,

    /// Flat-file output
    pub csv_path: PathBuf,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Table replaced on every run
    pub table_name: String,

    /// Append-only milestone log
    pub log_path: PathBuf,
}

impl Default for EtlConfig {
    fn default() -> Self {
        EtlConfig {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            rate_file: PathBuf::from(DEFAULT_RATE_FILE),
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

impl EtlConfig {
    /// Same defaults, with every output and input path placed under `dir`
    pub fn rooted_at(dir: &Path) -> Self {
        EtlConfig {
            rate_file: dir.join("exchange_rate.csv"),
            csv_path: dir.join("Largest_banks_data.csv"),
            db_path: dir.join("Banks.db"),
            log_path: dir.join("code_log.txt"),
            ..EtlConfig::default()
        }
    }

    /// Pretty JSON dump, logged at debug level when a run starts
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }
}
