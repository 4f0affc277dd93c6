//! QLedger 的請求 / 回應結構。
//!
//! 欄位名稱對應帳本 HTTP API 的 JSON：交易為 `id` / `data` / `timestamp` / `lines`，
//! 分錄為 `account` / `delta`。

use crate::utils::error::{LedgerError, Result};
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 帳本時間戳格式，序列化與解析共用同一個常數。
/// 對應帳本端 `2006-01-02 15:04:05.999` 的寫法：UTC、無時區、毫秒精度且省略尾端的 0。
pub const LEDGER_TIMESTAMP_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// 零值時間戳的 Unix 秒數 (0001-01-01 00:00:00 UTC)
const ZERO_TIMESTAMP_UNIX_SECONDS: i64 = -62_135_596_800;

/// `data` 中存放參與帳戶列表的欄位，搜尋也以此欄位過濾
pub const ACCOUNT_IDS_FIELD: &str = "accountIds";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<LedgerTransactionLine>,
}

// 欄位缺少或為 null 時取預設值，讓單筆不完整的紀錄不會拖垮整個搜尋結果
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransactionLine {
    #[serde(rename = "account")]
    pub account_id: String,
    pub delta: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: QueryClause,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryClause {
    pub must: MustClause,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MustClause {
    pub ranges: Vec<BTreeMap<String, RangeFilter>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeFilter {
    pub like: String,
}

impl SearchQuery {
    pub fn like(field: &str, value: &str) -> Self {
        let mut range = BTreeMap::new();
        range.insert(
            field.to_string(),
            RangeFilter {
                like: value.to_string(),
            },
        );
        Self {
            query: QueryClause {
                must: MustClause {
                    ranges: vec![range],
                },
            },
        }
    }

    pub fn account_ids_like(account_id: &str) -> Self {
        Self::like(ACCOUNT_IDS_FIELD, account_id)
    }
}

pub fn format_ledger_timestamp(ts: &DateTime<Utc>) -> String {
    let formatted = ts
        .trunc_subsecs(3)
        .format(LEDGER_TIMESTAMP_LAYOUT)
        .to_string();

    // 小數部分省略尾端的 0
    match formatted.split_once('.') {
        Some((seconds, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                seconds.to_string()
            } else {
                format!("{}.{}", seconds, fraction)
            }
        }
        None => formatted,
    }
}

/// 無法解析的時間戳以此零值代替，可用 [`is_zero_timestamp`] 與真實時間區分
pub fn zero_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(ZERO_TIMESTAMP_UNIX_SECONDS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn is_zero_timestamp(ts: &DateTime<Utc>) -> bool {
    *ts == zero_timestamp()
}

pub fn parse_ledger_timestamp(value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, LEDGER_TIMESTAMP_LAYOUT)
        .map(|naive| naive.and_utc())
        .map_err(|source| LedgerError::TimestampError {
            value: value.to_string(),
            source,
        })
}
