use super::LedgerConfig;
use crate::adapters::export::OutputFormat;
use crate::adapters::qledger::TimestampPolicy;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "qledger-store")]
#[command(about = "Record and query general ledger transactions in a QLedger service")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML file with ledger settings")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Ledger endpoint, overrides QLEDGER_ENDPOINT")]
    pub endpoint: Option<String>,

    #[arg(long, global = true, help = "Ledger API token, overrides QLEDGER_API_TOKEN")]
    pub api_token: Option<String>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, global = true, help = "Fail when the ledger returns an unparsable timestamp")]
    pub strict_timestamps: bool,

    #[arg(long, global = true, help = "Store line purposes in transaction data")]
    pub record_purposes: bool,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check that the ledger is reachable
    Ping,
    /// Create a transaction read from a JSON file
    Create {
        #[arg(long)]
        account: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// List the transactions posted against an account
    List {
        #[arg(long)]
        account: String,
        #[arg(long, default_value = "json", value_parser = parse_format)]
        format: OutputFormat,
        #[arg(long, help = "Write to a file instead of stdout")]
        output: Option<PathBuf>,
    },
}

fn parse_format(value: &str) -> std::result::Result<OutputFormat, String> {
    value.parse().map_err(|e: crate::utils::error::LedgerError| e.to_string())
}

impl CliConfig {
    /// 合併設定來源：TOML 檔案 < 環境變數 < 命令列參數
    pub fn ledger_config(&self) -> Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => LedgerConfig::from_file(path)?,
            None => LedgerConfig::default(),
        };
        config.apply_env()?;
        self.apply_flags(&mut config);
        Ok(config)
    }

    fn apply_flags(&self, config: &mut LedgerConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(token) = &self.api_token {
            config.api_token = token.clone();
        }
        if self.timeout_seconds.is_some() {
            config.timeout_seconds = self.timeout_seconds;
        }
        if self.strict_timestamps {
            config.timestamp_policy = TimestampPolicy::Strict;
        }
        if self.record_purposes {
            config.record_purposes = true;
        }
    }
}
