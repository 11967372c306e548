// Entity Models
// Rows flowing through extract → transform → load

pub mod bank;

pub use bank::{
    BankRecord, BankTable,
    COL_NAME, COL_MC_USD, COL_MC_GBP, COL_MC_EUR, COL_MC_INR,
    FINAL_COLUMNS,
};
