use crate::utils::error::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 一筆分錄的用途分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionPurpose {
    #[serde(rename = "achcredit")]
    AchCredit,
    #[serde(rename = "achdebit")]
    AchDebit,
    #[serde(rename = "achfee")]
    AchFee,
    #[serde(rename = "achreturn")]
    AchReturn,
    #[serde(rename = "cardpayment")]
    CardPayment,
    #[serde(rename = "checkpayment")]
    CheckPayment,
    #[serde(rename = "internal")]
    InternalTransfer,
}

impl TransactionPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionPurpose::AchCredit => "achcredit",
            TransactionPurpose::AchDebit => "achdebit",
            TransactionPurpose::AchFee => "achfee",
            TransactionPurpose::AchReturn => "achreturn",
            TransactionPurpose::CardPayment => "cardpayment",
            TransactionPurpose::CheckPayment => "checkpayment",
            TransactionPurpose::InternalTransfer => "internal",
        }
    }
}

impl fmt::Display for TransactionPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionPurpose {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "achcredit" => Ok(TransactionPurpose::AchCredit),
            "achdebit" => Ok(TransactionPurpose::AchDebit),
            "achfee" => Ok(TransactionPurpose::AchFee),
            "achreturn" => Ok(TransactionPurpose::AchReturn),
            "cardpayment" => Ok(TransactionPurpose::CardPayment),
            "checkpayment" => Ok(TransactionPurpose::CheckPayment),
            "internal" => Ok(TransactionPurpose::InternalTransfer),
            other => Err(LedgerError::InvalidPurpose(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLine {
    pub account_id: String,
    /// 帶正負號的金額，以最小貨幣單位計
    pub amount: i64,
    pub purpose: TransactionPurpose,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub lines: Vec<TransactionLine>,
}

impl Transaction {
    /// 各分錄金額加總。借貸平衡由帳本服務負責，這裡不做檢查。
    /// 以 i128 累加，任何 i64 金額組合都不會溢位。
    pub fn balance(&self) -> i128 {
        self.lines.iter().map(|line| i128::from(line.amount)).sum()
    }
}
