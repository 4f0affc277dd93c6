use super::client::{HttpLedgerClient, LedgerClient};
use super::wire::{
    format_ledger_timestamp, parse_ledger_timestamp, zero_timestamp, LedgerTransaction,
    LedgerTransactionLine, SearchQuery, ACCOUNT_IDS_FIELD,
};
use crate::config::LedgerConfig;
use crate::domain::{Transaction, TransactionLine, TransactionPurpose, TransactionRepository};
use crate::utils::error::{LedgerError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// 帳本回傳的時間戳無法解析時的處理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPolicy {
    /// 忽略錯誤，時間戳設為零值 0001-01-01 UTC (見 `wire::zero_timestamp`)，
    /// 欄位缺少或為 null 也視同無法解析
    #[default]
    Lenient,
    /// 整個查詢以 QueryError 失敗
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryOptions {
    pub timestamp_policy: TimestampPolicy,
    /// 將每個分錄的用途寫入 `data["<accountId>_purpose"]`，查詢時優先讀回
    pub record_purposes: bool,
}

pub struct QLedgerTransactionRepository<C: LedgerClient> {
    client: C,
    options: RepositoryOptions,
}

impl QLedgerTransactionRepository<HttpLedgerClient> {
    pub fn setup(endpoint: &str, api_token: &str) -> Result<Self> {
        if endpoint.is_empty() || api_token.is_empty() {
            return Err(LedgerError::ConfigError {
                message: format!("qledger: empty endpoint={:?} and/or apiToken", endpoint),
            });
        }
        Ok(Self::with_client(HttpLedgerClient::new(endpoint, api_token)))
    }

    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        config.validate()?;

        let mut repository = Self::setup(&config.endpoint, &config.api_token)?;
        if let Some(seconds) = config.timeout_seconds {
            repository.client = repository
                .client
                .with_timeout(Duration::from_secs(seconds));
        }
        repository.options = config.repository_options();

        tracing::debug!(
            "QLedger repository configured for {} ({:?})",
            repository.client.endpoint(),
            repository.options
        );
        Ok(repository)
    }
}

impl<C: LedgerClient> QLedgerTransactionRepository<C> {
    pub fn with_client(client: C) -> Self {
        Self {
            client,
            options: RepositoryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RepositoryOptions) -> Self {
        self.options = options;
        self
    }

    fn ledger_payload(&self, tx: &Transaction) -> LedgerTransaction {
        let mut data = Map::new();
        data.insert(
            ACCOUNT_IDS_FIELD.to_string(),
            Value::String(join_account_ids(&tx.lines)),
        );

        let lines = tx
            .lines
            .iter()
            .map(|line| {
                if self.options.record_purposes {
                    data.insert(
                        purpose_key(&line.account_id),
                        Value::String(line.purpose.as_str().to_string()),
                    );
                }
                LedgerTransactionLine {
                    account_id: line.account_id.clone(),
                    delta: line.amount,
                }
            })
            .collect();

        LedgerTransaction {
            id: tx.id.clone(),
            data,
            timestamp: format_ledger_timestamp(&tx.timestamp),
            lines,
        }
    }

    fn rebuild_transaction(&self, xfer: LedgerTransaction) -> Result<Transaction> {
        let lines = xfer
            .lines
            .iter()
            .map(|line| TransactionLine {
                account_id: line.account_id.clone(),
                amount: line.delta,
                purpose: self.line_purpose(&xfer.data, line),
            })
            .collect();

        let timestamp = match parse_ledger_timestamp(&xfer.timestamp) {
            Ok(ts) => ts,
            Err(e) => match self.options.timestamp_policy {
                TimestampPolicy::Strict => return Err(e),
                TimestampPolicy::Lenient => {
                    tracing::debug!("Transaction {}: {}, using zero timestamp", xfer.id, e);
                    zero_timestamp()
                }
            },
        };

        Ok(Transaction {
            id: xfer.id,
            timestamp,
            lines,
        })
    }

    fn line_purpose(
        &self,
        data: &Map<String, Value>,
        line: &LedgerTransactionLine,
    ) -> TransactionPurpose {
        if self.options.record_purposes {
            let recorded = data
                .get(&purpose_key(&line.account_id))
                .and_then(Value::as_str)
                .and_then(|tag| tag.parse().ok());
            if let Some(purpose) = recorded {
                return purpose;
            }
        }
        purpose_from_delta(line.delta)
    }
}

#[async_trait]
impl<C: LedgerClient> TransactionRepository for QLedgerTransactionRepository<C> {
    async fn ping(&self) -> Result<()> {
        self.client.ping().await
    }

    async fn create_transaction(&self, account_id: &str, tx: &Transaction) -> Result<()> {
        let payload = self.ledger_payload(tx);
        tracing::debug!(
            "Creating transaction {} for account {} ({} lines)",
            tx.id,
            account_id,
            payload.lines.len()
        );

        self.client
            .create_transaction(&payload)
            .await
            .map_err(LedgerError::storage)?;

        tracing::info!("Created transaction {} in ledger", tx.id);
        Ok(())
    }

    async fn get_account_transactions(&self, account_id: &str) -> Result<Vec<Transaction>> {
        let query = SearchQuery::account_ids_like(account_id);
        let xfers = self
            .client
            .search_transactions(&query)
            .await
            .map_err(LedgerError::query)?;

        let transactions = xfers
            .into_iter()
            .map(|xfer| self.rebuild_transaction(xfer))
            .collect::<Result<Vec<_>>>()
            .map_err(LedgerError::query)?;

        tracing::debug!(
            "Found {} transactions for account {}",
            transactions.len(),
            account_id
        );
        Ok(transactions)
    }
}

/// 以逗號串接參與的帳戶 ID，寫入 `data.accountIds` 供搜尋使用。
///
/// 目前只取第一筆分錄的帳戶：只有第一個帳戶能經由搜尋查到這筆交易。
pub fn join_account_ids(lines: &[TransactionLine]) -> String {
    lines
        .iter()
        .take(1)
        .map(|line| line.account_id.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// 帳本尚未保存分錄用途，依金額正負推回
pub fn purpose_from_delta(delta: i64) -> TransactionPurpose {
    if delta < 0 {
        TransactionPurpose::AchDebit
    } else {
        TransactionPurpose::AchCredit
    }
}

fn purpose_key(account_id: &str) -> String {
    format!("{}_purpose", account_id)
}
