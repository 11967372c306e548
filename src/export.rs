// 📄 CSV Export - Final table as a flat file
//
// Layout matches a data-frame CSV dump: a leading unnamed index column,
// then the five named columns.
//
//   ,Name,MC_USD_Billion,MC_GBP_Billion,MC_EUR_Billion,MC_INR_Billion
//   0,JPMorgan Chase,432.92,346.34,402.62,35910.71

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::entities::{BankRecord, BankTable, FINAL_COLUMNS};

/// One CSV line: row position + the record's columns
#[derive(Debug, Serialize, Deserialize)]
struct IndexedRow {
    #[serde(rename = "")]
    index: usize,

    #[serde(rename = "Name")]
    name: String,

    #[serde(rename = "MC_USD_Billion")]
    mc_usd_billion: f64,

    #[serde(rename = "MC_GBP_Billion")]
    mc_gbp_billion: f64,

    #[serde(rename = "MC_EUR_Billion")]
    mc_eur_billion: f64,

    #[serde(rename = "MC_INR_Billion")]
    mc_inr_billion: f64,
}

impl IndexedRow {
    fn new(index: usize, record: &BankRecord) -> Self {
        IndexedRow {
            index,
            name: record.name.clone(),
            mc_usd_billion: record.mc_usd_billion,
            mc_gbp_billion: record.mc_gbp_billion,
            mc_eur_billion: record.mc_eur_billion,
            mc_inr_billion: record.mc_inr_billion,
        }
    }

    fn into_record(self) -> BankRecord {
        BankRecord {
            name: self.name,
            mc_usd_billion: self.mc_usd_billion,
            mc_gbp_billion: self.mc_gbp_billion,
            mc_eur_billion: self.mc_eur_billion,
            mc_inr_billion: self.mc_inr_billion,
        }
    }
}

/// Write the whole table to `path`, replacing any existing file
pub fn load_to_csv(table: &[BankRecord], path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    // Header is written up front so an empty table still gets one
    let mut header = vec![""];
    header.extend(FINAL_COLUMNS);
    writer
        .write_record(&header)
        .with_context(|| format!("Failed to write CSV header to {}", path.display()))?;

    for (index, record) in table.iter().enumerate() {
        writer
            .serialize(IndexedRow::new(index, record))
            .with_context(|| format!("Failed to write row {} to {}", index, path.display()))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;

    tracing::debug!(rows = table.len(), path = %path.display(), "wrote CSV");
    Ok(())
}

/// Read a file written by `load_to_csv`; the index column is dropped
pub fn read_csv(path: &Path) -> Result<BankTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let mut table = BankTable::new();
    for result in reader.deserialize() {
        let row: IndexedRow = result.context("Failed to deserialize bank row")?;
        table.push(row.into_record());
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_table() -> BankTable {
        vec![
            BankRecord {
                name: "JPMorgan Chase".to_string(),
                mc_usd_billion: 432.92,
                mc_gbp_billion: 346.34,
                mc_eur_billion: 402.62,
                mc_inr_billion: 35910.71,
            },
            BankRecord {
                name: "Bank A, Holdings".to_string(),
                mc_usd_billion: 100.0,
                mc_gbp_billion: 80.0,
                mc_eur_billion: 93.0,
                mc_inr_billion: 8295.0,
            },
        ]
    }

    #[test]
    fn test_header_and_index_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Largest_banks_data.csv");

        load_to_csv(&sample_table(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(
            lines[0],
            ",Name,MC_USD_Billion,MC_GBP_Billion,MC_EUR_Billion,MC_INR_Billion"
        );
        assert_eq!(lines[1], "0,JPMorgan Chase,432.92,346.34,402.62,35910.71");
        assert_eq!(lines[2], "1,\"Bank A, Holdings\",100.0,80.0,93.0,8295.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_round_trip_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banks.csv");
        let table = sample_table();

        load_to_csv(&table, &path).unwrap();
        let loaded = read_csv(&path).unwrap();

        assert_eq!(loaded, table);
    }

    #[test]
    fn test_existing_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banks.csv");
        fs::write(&path, "stale content\nmore stale\nand more\nand more\n").unwrap();

        load_to_csv(&sample_table()[..1], &path).unwrap();

        let loaded = read_csv(&path).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        load_to_csv(&[], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(read_csv(&path).unwrap().is_empty());
    }
}
