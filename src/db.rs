use anyhow::{bail, Context, Result};
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::fmt;
use std::path::Path;

use crate::entities::{BankRecord, BankTable, COL_MC_GBP, COL_NAME};

// ============================================================================
// CONNECTION
// ============================================================================

/// Open (or create) the SQLite database file
pub fn open_database(db_path: &Path) -> Result<Connection> {
    Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))
}

/// Table names are interpolated into SQL, so only plain identifiers are allowed
pub fn validate_table_name(table_name: &str) -> Result<()> {
    let mut chars = table_name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest {
        bail!("Invalid table name: {:?}", table_name);
    }
    Ok(())
}

// ============================================================================
// LOAD (bulk replace)
// ============================================================================

/// Replace `table_name` with the given rows
///
/// Drop + create + insert run in one transaction: the table ends up with
/// exactly these rows, however many times this is called.
pub fn load_to_db(table: &[BankRecord], conn: &Connection, table_name: &str) -> Result<()> {
    validate_table_name(table_name)?;

    let tx = conn
        .unchecked_transaction()
        .context("Failed to start load transaction")?;

    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS \"{table}\";
         CREATE TABLE \"{table}\" (
            Name TEXT,
            MC_USD_Billion REAL,
            MC_GBP_Billion REAL,
            MC_EUR_Billion REAL,
            MC_INR_Billion REAL
         );",
        table = table_name
    ))
    .with_context(|| format!("Failed to recreate table {}", table_name))?;

    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO \"{}\" (
                Name, MC_USD_Billion, MC_GBP_Billion, MC_EUR_Billion, MC_INR_Billion
            ) VALUES (?1, ?2, ?3, ?4, ?5)",
            table_name
        ))?;

        for record in table {
            stmt.execute(params![
                record.name,
                record.mc_usd_billion,
                record.mc_gbp_billion,
                record.mc_eur_billion,
                record.mc_inr_billion,
            ])
            .with_context(|| format!("Failed to insert {}", record.name))?;
        }
    }

    tx.commit().context("Failed to commit load transaction")?;

    tracing::debug!(rows = table.len(), table = table_name, "replaced table");
    Ok(())
}

/// Read every row of a loaded table back, in storage order
pub fn get_all_banks(conn: &Connection, table_name: &str) -> Result<BankTable> {
    validate_table_name(table_name)?;

    let mut stmt = conn.prepare(&format!(
        "SELECT Name, MC_USD_Billion, MC_GBP_Billion, MC_EUR_Billion, MC_INR_Billion
         FROM \"{}\"
         ORDER BY rowid",
        table_name
    ))?;

    let banks = stmt
        .query_map([], |row| {
            Ok(BankRecord {
                name: row.get(0)?,
                mc_usd_billion: row.get(1)?,
                mc_gbp_billion: row.get(2)?,
                mc_eur_billion: row.get(3)?,
                mc_inr_billion: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(banks)
}

pub fn count_rows(conn: &Connection, table_name: &str) -> Result<i64> {
    validate_table_name(table_name)?;

    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table_name), [], |row| {
        row.get(0)
    })?;
    Ok(count)
}

// ============================================================================
// QUERIES
// ============================================================================

/// The three read-back statements run after loading
pub fn fixed_queries(table_name: &str) -> [String; 3] {
    [
        format!("SELECT * FROM {}", table_name),
        format!("SELECT AVG({}) FROM {}", COL_MC_GBP, table_name),
        format!("SELECT {} from {} LIMIT 5", COL_NAME, table_name),
    ]
}

/// Column names + every row of a statement, dynamically typed
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column of the first row as a number (aggregates like AVG)
    pub fn scalar_f64(&self) -> Option<f64> {
        match self.rows.first()?.first()? {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Every value of one column, rendered as text
    pub fn column_text(&self, name: &str) -> Option<Vec<String>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| format_value(&row[idx])).collect())
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => format!("{:?}", v),
        Value::Text(v) => v.clone(),
        Value::Blob(v) => format!("<{} bytes>", v.len()),
    }
}

/// Data-frame style: leading row index, every column right-aligned
impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(format_value).collect())
            .collect();

        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (name, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", name, width = *width)?;
        }
        writeln!(f)?;

        for (idx, row) in cells.iter().enumerate() {
            write!(f, "{:<index_width$}", idx)?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell, width = *width)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Execute a statement and collect all of its rows
pub fn fetch_query(conn: &Connection, statement: &str) -> Result<QueryResult> {
    let mut stmt = conn
        .prepare(statement)
        .with_context(|| format!("Failed to prepare query: {}", statement))?;

    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let column_count = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..column_count)
                .map(|i| row.get::<_, Value>(i))
                .collect::<Result<Vec<_>, _>>()
        })?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to run query: {}", statement))?;

    Ok(QueryResult { columns, rows })
}

/// Execute a statement and print the statement and its rows to stdout
pub fn run_query(statement: &str, conn: &Connection) -> Result<()> {
    let result = fetch_query(conn, statement)?;

    println!("{}", statement);
    print!("{}", result);
    println!();

    Ok(())
}
