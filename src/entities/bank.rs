// 🏦 Bank Record - One row of the largest-banks ranking
//
// "Name" + market cap in billions, first in USD as scraped,
// then in GBP / EUR / INR once the rates have been applied.
//
// Rows have no identity beyond their position: the page ranking order
// is the table order, and names are not guaranteed unique.

use serde::{Deserialize, Serialize};

// ============================================================================
// COLUMN NAMES (CSV header + SQLite columns)
// ============================================================================

pub const COL_NAME: &str = "Name";
pub const COL_MC_USD: &str = "MC_USD_Billion";
pub const COL_MC_GBP: &str = "MC_GBP_Billion";
pub const COL_MC_EUR: &str = "MC_EUR_Billion";
pub const COL_MC_INR: &str = "MC_INR_Billion";

/// Columns of the final (transformed) table, in output order
pub const FINAL_COLUMNS: [&str; 5] = [COL_NAME, COL_MC_USD, COL_MC_GBP, COL_MC_EUR, COL_MC_INR];

// ============================================================================
// BANK RECORD
// ============================================================================

/// A single bank and its market capitalization (billions)
///
/// Created by the extractor with `name` and `mc_usd_billion` only;
/// the derived currency fields stay at 0.0 until the transformer fills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "MC_USD_Billion")]
    pub mc_usd_billion: f64,

    #[serde(rename = "MC_GBP_Billion")]
    pub mc_gbp_billion: f64,

    #[serde(rename = "MC_EUR_Billion")]
    pub mc_eur_billion: f64,

    #[serde(rename = "MC_INR_Billion")]
    pub mc_inr_billion: f64,
}

impl BankRecord {
    /// Record as produced by extraction (USD only)
    pub fn extracted(name: impl Into<String>, mc_usd_billion: f64) -> Self {
        BankRecord {
            name: name.into(),
            mc_usd_billion,
            mc_gbp_billion: 0.0,
            mc_eur_billion: 0.0,
            mc_inr_billion: 0.0,
        }
    }

    /// All four market-cap values present and non-negative
    pub fn is_complete(&self) -> bool {
        [
            self.mc_usd_billion,
            self.mc_gbp_billion,
            self.mc_eur_billion,
            self.mc_inr_billion,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    }
}

// ============================================================================
// BANK TABLE
// ============================================================================

/// Ordered rows, page ranking order preserved
pub type BankTable = Vec<BankRecord>;
