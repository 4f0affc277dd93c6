pub mod adapters;
pub mod config;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, Command};

pub use adapters::qledger::{HttpLedgerClient, LedgerClient, QLedgerTransactionRepository};
pub use config::LedgerConfig;
pub use domain::{Transaction, TransactionLine, TransactionPurpose, TransactionRepository};
pub use utils::error::{LedgerError, Result};
