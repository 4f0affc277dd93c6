#[cfg(feature = "cli")]
pub mod cli;

use crate::adapters::qledger::{RepositoryOptions, TimestampPolicy};
use crate::utils::error::{LedgerError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

pub const ENV_ENDPOINT: &str = "QLEDGER_ENDPOINT";
pub const ENV_API_TOKEN: &str = "QLEDGER_API_TOKEN";
pub const ENV_TIMEOUT_SECONDS: &str = "QLEDGER_TIMEOUT_SECONDS";

const MAX_TIMEOUT_SECONDS: u64 = 300;

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_token: String,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub timestamp_policy: TimestampPolicy,
    #[serde(default)]
    pub record_purposes: bool,
}

// api_token 不寫進日誌
impl fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("endpoint", &self.endpoint)
            .field("api_token", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("timestamp_policy", &self.timestamp_policy)
            .field("record_purposes", &self.record_purposes)
            .finish()
    }
}

impl LedgerConfig {
    pub fn new(endpoint: &str, api_token: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_token: api_token.to_string(),
            ..Default::default()
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，支援 ${VAR} 環境變數替換
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LedgerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// 以環境變數覆寫已設定的值，空字串視為未設定
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(endpoint) = non_empty(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(token) = non_empty(ENV_API_TOKEN) {
            self.api_token = token;
        }
        if let Some(raw) = non_empty(ENV_TIMEOUT_SECONDS) {
            let seconds = raw
                .parse::<u64>()
                .map_err(|e| LedgerError::InvalidConfigValueError {
                    field: ENV_TIMEOUT_SECONDS.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
            self.timeout_seconds = Some(seconds);
        }
        Ok(())
    }

    pub fn repository_options(&self) -> RepositoryOptions {
        RepositoryOptions {
            timestamp_policy: self.timestamp_policy,
            record_purposes: self.record_purposes,
        }
    }
}

impl Validate for LedgerConfig {
    fn validate(&self) -> Result<()> {
        for (field, value) in [("endpoint", &self.endpoint), ("api_token", &self.api_token)] {
            if value.is_empty() {
                return Err(LedgerError::MissingConfigError {
                    field: field.to_string(),
                });
            }
        }

        validation::validate_url("endpoint", &self.endpoint)?;
        validation::validate_non_empty_string("api_token", &self.api_token)?;

        if let Some(seconds) = self.timeout_seconds {
            validation::validate_range("timeout_seconds", seconds, 1, MAX_TIMEOUT_SECONDS)?;
        }

        tracing::debug!("✅ Ledger configuration validation passed");
        Ok(())
    }
}

/// 替換 ${VAR}，未設定的變數保留原字樣
fn substitute_env_vars(content: &str) -> String {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}
