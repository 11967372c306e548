// 🔁 Pipeline - Extract → Transform → Load → Query, once
//
// Init → Extract → Transform → LoadFile → LoadStore → Query×3 → Close
//
// The first failing step stops the run (`?`); the milestones already
// written to the progress log stay there. The database connection is
// only closed explicitly on the success path.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::EtlConfig;
use crate::db::{fixed_queries, load_to_db, open_database, run_query};
use crate::export::load_to_csv;
use crate::parser::{extract_with, HttpFetcher, PageFetcher};
use crate::progress::*;
use crate::rates::transform;

/// What a successful run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub rows: usize,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub table_name: String,
}

/// Full run against the live page
pub fn run(config: &EtlConfig) -> Result<RunSummary> {
    run_with_fetcher(config, &HttpFetcher::new()?)
}

/// Full run, page body supplied by `fetcher`
pub fn run_with_fetcher(config: &EtlConfig, fetcher: &dyn PageFetcher) -> Result<RunSummary> {
    let log = ProgressLog::new(&config.log_path);
    tracing::debug!(config = %config.to_json()?, "starting ETL run");

    log.log(MSG_PRELIMINARIES)?;

    // 1. Extract
    log.log(MSG_EXTRACT_STARTED)?;
    let extracted = extract_with(fetcher, &config.source_url)?;
    log.log(MSG_EXTRACT_DONE)?;

    // 2. Transform
    log.log(MSG_TRANSFORM_STARTED)?;
    let transformed = transform(extracted, &config.rate_file)?;
    log.log(MSG_TRANSFORM_DONE)?;

    // 3. Load
    log.log(MSG_LOAD_STARTED)?;
    load_to_csv(&transformed, &config.csv_path)?;
    log.log(MSG_CSV_SAVED)?;

    let conn = open_database(&config.db_path)?;
    log.log(MSG_SQL_CONNECTED)?;

    load_to_db(&transformed, &conn, &config.table_name)?;
    log.log(MSG_DB_LOADED)?;

    // 4. Query
    for statement in fixed_queries(&config.table_name) {
        run_query(&statement, &conn)?;
    }
    log.log(MSG_PROCESS_COMPLETE)?;

    conn.close()
        .map_err(|(_, e)| e)
        .context("Failed to close database connection")?;
    log.log(MSG_CONNECTION_CLOSED)?;

    Ok(RunSummary {
        rows: transformed.len(),
        csv_path: config.csv_path.clone(),
        db_path: config.db_path.clone(),
        table_name: config.table_name.clone(),
    })
}
