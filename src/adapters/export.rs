use crate::domain::{Transaction, TransactionPurpose};
use crate::utils::error::{LedgerError, Result};
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(LedgerError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: json, csv".to_string(),
            }),
        }
    }
}

/// CSV 每列對應一筆分錄
#[derive(Debug, Serialize)]
struct LineRow<'a> {
    transaction_id: &'a str,
    timestamp: String,
    account_id: &'a str,
    amount: i64,
    purpose: TransactionPurpose,
}

pub fn write_transactions<W: Write>(
    writer: W,
    transactions: &[Transaction],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(writer, transactions),
        OutputFormat::Csv => write_csv(writer, transactions),
    }
}

fn write_json<W: Write>(mut writer: W, transactions: &[Transaction]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, transactions)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn write_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for tx in transactions {
        for line in &tx.lines {
            csv_writer.serialize(LineRow {
                transaction_id: &tx.id,
                timestamp: tx.timestamp.to_rfc3339(),
                account_id: &line.account_id,
                amount: line.amount,
                purpose: line.purpose,
            })?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}
