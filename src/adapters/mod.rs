// Adapters layer: concrete implementations for external systems (ledger http, export)

pub mod export;
pub mod qledger;
