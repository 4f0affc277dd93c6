// Domain layer: core models and ports. No transport code here.

pub mod model;
pub mod ports;

pub use model::{Transaction, TransactionLine, TransactionPurpose};
pub use ports::TransactionRepository;
