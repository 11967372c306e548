use anyhow::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use largest_banks_etl::{run, EtlConfig};

fn main() -> Result<()> {
    // RUST_LOG overrides the default verbosity
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("largest_banks_etl=info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = EtlConfig::default();

    let summary = run(&config)?;

    tracing::info!(
        rows = summary.rows,
        csv = %summary.csv_path.display(),
        db = %summary.db_path.display(),
        table = %summary.table_name,
        "ETL run complete"
    );

    Ok(())
}
