// Largest Banks ETL - Core Library
// Exposes every pipeline step for the binary and the tests

pub mod config;
pub mod progress;
pub mod entities;
pub mod parser;
pub mod rates;
pub mod export;
pub mod db;
pub mod pipeline;

// Re-export commonly used types
pub use config::EtlConfig;
pub use progress::ProgressLog;
pub use entities::{BankRecord, BankTable, FINAL_COLUMNS};
pub use parser::{
    PageFetcher, HttpFetcher, StaticPage,
    extract, extract_with, parse_bank_table,
};
pub use rates::{
    Currency, ExchangeRateTable,
    transform, apply_rates, round_to_cents,
};
pub use export::{load_to_csv, read_csv};
pub use db::{
    QueryResult,
    open_database, load_to_db, fetch_query, run_query, fixed_queries,
};
pub use pipeline::{run, run_with_fetcher, RunSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
