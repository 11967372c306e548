// 💱 Exchange Rates + Transform
//
// Rates are multipliers FROM USD: 1 USD = rate units of the target
// currency. Each derived market cap is usd * rate, rounded to cents
// half-to-even.

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::entities::{BankRecord, BankTable};

// ============================================================================
// CURRENCY
// ============================================================================

/// Currencies derived from the USD market cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    GBP,
    EUR,
    INR,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::GBP, Currency::EUR, Currency::INR];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::GBP => "GBP",
            Currency::EUR => "EUR",
            Currency::INR => "INR",
        }
    }
}

// ============================================================================
// EXCHANGE RATE TABLE
// ============================================================================

/// Currency code → multiplier, loaded once and read-only afterwards
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExchangeRateTable {
    rates: BTreeMap<String, f64>,
}

impl ExchangeRateTable {
    /// Read a two-column CSV (header row, then `code,rate` rows)
    ///
    /// Header names are ignored; only column position matters.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open exchange rate file: {}", path.display()))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut table = ExchangeRateTable::default();

        for (line_num, result) in reader.records().enumerate() {
            let record = result.with_context(|| {
                format!("Failed to parse line {} in {}", line_num + 2, path.display())
            })?;

            let code = record.get(0).unwrap_or("");
            let rate_str = record.get(1).unwrap_or("");

            let rate: f64 = rate_str.parse().with_context(|| {
                format!("Invalid rate {:?} for {:?} on line {}", rate_str, code, line_num + 2)
            })?;

            table.insert(code, rate)?;
        }

        table.require_all()?;
        Ok(table)
    }

    /// Build from pairs (same validation as `load`)
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Result<Self> {
        let mut table = ExchangeRateTable::default();
        for (code, rate) in pairs {
            table.insert(code, rate)?;
        }
        table.require_all()?;
        Ok(table)
    }

    fn insert(&mut self, code: &str, rate: f64) -> Result<()> {
        if code.is_empty() {
            bail!("Empty currency code in exchange rate table");
        }
        if !rate.is_finite() || rate <= 0.0 {
            bail!("Exchange rate for {} must be positive, got {}", code, rate);
        }
        self.rates.insert(code.to_string(), rate);
        Ok(())
    }

    fn require_all(&self) -> Result<()> {
        for currency in Currency::ALL {
            if !self.rates.contains_key(currency.code()) {
                bail!("Exchange rate table has no rate for {}", currency.code());
            }
        }
        Ok(())
    }

    /// Rate for any code present in the file
    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Rate for a required currency (always present after validation)
    pub fn rate(&self, currency: Currency) -> f64 {
        self.rates.get(currency.code()).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

// ============================================================================
// TRANSFORM
// ============================================================================

/// Round to 2 decimals, ties to even (e.g. 0.125 → 0.12, 0.135 → 0.14)
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Load the rate file and add the GBP / EUR / INR columns
pub fn transform(table: BankTable, rate_file_path: &Path) -> Result<BankTable> {
    let rates = ExchangeRateTable::load(rate_file_path)?;
    tracing::debug!(currencies = rates.len(), "loaded exchange rates");

    Ok(apply_rates(table, &rates))
}

/// Fill the derived currency fields; count and order are unchanged
pub fn apply_rates(table: BankTable, rates: &ExchangeRateTable) -> BankTable {
    let gbp = rates.rate(Currency::GBP);
    let eur = rates.rate(Currency::EUR);
    let inr = rates.rate(Currency::INR);

    table
        .into_iter()
        .map(|record| BankRecord {
            mc_gbp_billion: round_to_cents(record.mc_usd_billion * gbp),
            mc_eur_billion: round_to_cents(record.mc_usd_billion * eur),
            mc_inr_billion: round_to_cents(record.mc_usd_billion * inr),
            ..record
        })
        .collect()
}
