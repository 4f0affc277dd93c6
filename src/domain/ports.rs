use crate::domain::model::Transaction;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 交易儲存的對外介面，伺服器端的 handler 只依賴這個 trait。
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn create_transaction(&self, account_id: &str, tx: &Transaction) -> Result<()>;

    async fn get_account_transactions(&self, account_id: &str) -> Result<Vec<Transaction>>;
}
