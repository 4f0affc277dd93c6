use super::wire::{LedgerTransaction, SearchQuery};
use crate::utils::error::{LedgerError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

/// 帳本服務的傳輸層。每個方法只做一次請求，不重試。
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn create_transaction(&self, tx: &LedgerTransaction) -> Result<()>;

    async fn search_transactions(&self, query: &SearchQuery) -> Result<Vec<LedgerTransaction>>;
}

#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    client: Client,
    endpoint: String,
    api_token: String,
    timeout: Option<Duration>,
}

impl HttpLedgerClient {
    pub fn new(endpoint: &str, api_token: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        request = request.header(reqwest::header::AUTHORIZATION, &self.api_token);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("Ledger response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(LedgerError::StatusError {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn ping(&self) -> Result<()> {
        let url = self.url("/ping");
        tracing::debug!("Pinging ledger at: {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn create_transaction(&self, tx: &LedgerTransaction) -> Result<()> {
        let url = self.url("/v1/transactions");
        tracing::debug!("POST {} (transaction {}, {} lines)", url, tx.id, tx.lines.len());

        let response = self
            .authorize(self.client.post(&url))
            .json(tx)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn search_transactions(&self, query: &SearchQuery) -> Result<Vec<LedgerTransaction>> {
        let url = self.url("/v1/transactions/_search");
        tracing::debug!("POST {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .json(query)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        // 先取文字再解析，解析錯誤歸類為序列化錯誤而非傳輸錯誤
        let body = response.text().await?;
        let transactions: Vec<LedgerTransaction> = serde_json::from_str(&body)?;
        tracing::debug!("Ledger returned {} transactions", transactions.len());
        Ok(transactions)
    }
}
