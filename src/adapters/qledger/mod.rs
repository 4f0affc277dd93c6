//! QLedger adapter: maps internal transactions to the ledger's HTTP API and back.

pub mod client;
pub mod repository;
pub mod wire;

pub use client::{HttpLedgerClient, LedgerClient};
pub use repository::{
    join_account_ids, purpose_from_delta, QLedgerTransactionRepository, RepositoryOptions,
    TimestampPolicy,
};
pub use wire::{
    is_zero_timestamp, zero_timestamp, LedgerTransaction, LedgerTransactionLine, SearchQuery,
    LEDGER_TIMESTAMP_LAYOUT,
};
