use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("ledger responded with status {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value:?} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("qledger: createTransaction: {source}")]
    StorageError {
        #[source]
        source: Box<LedgerError>,
    },

    #[error("qledger: getAccountTransactions: {source}")]
    QueryError {
        #[source]
        source: Box<LedgerError>,
    },

    #[error("invalid ledger timestamp {value:?}: {source}")]
    TimestampError {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("unknown transaction purpose: {0:?}")]
    InvalidPurpose(String),
}

impl LedgerError {
    pub(crate) fn storage(source: LedgerError) -> Self {
        LedgerError::StorageError {
            source: Box::new(source),
        }
    }

    pub(crate) fn query(source: LedgerError) -> Self {
        LedgerError::QueryError {
            source: Box::new(source),
        }
    }

    /// 設定相關錯誤 (啟動時即失敗)
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            LedgerError::ConfigError { .. }
                | LedgerError::InvalidConfigValueError { .. }
                | LedgerError::MissingConfigError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
