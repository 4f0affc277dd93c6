use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use qledger_store::adapters::qledger::{is_zero_timestamp, TimestampPolicy};
use qledger_store::{
    LedgerConfig, LedgerError, QLedgerTransactionRepository, Transaction, TransactionLine,
    TransactionPurpose, TransactionRepository,
};
use serde_json::json;
use std::time::Duration;

const TOKEN: &str = "test-token";

fn repository(server: &MockServer) -> QLedgerTransactionRepository<qledger_store::HttpLedgerClient> {
    QLedgerTransactionRepository::setup(&server.base_url(), TOKEN).unwrap()
}

fn sample_transaction() -> Transaction {
    Transaction {
        id: "tx-100".to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 3, 5, 10, 15, 30).unwrap()
            + chrono::Duration::milliseconds(250),
        lines: vec![
            TransactionLine {
                account_id: "A".to_string(),
                amount: 100,
                purpose: TransactionPurpose::AchCredit,
            },
            TransactionLine {
                account_id: "B".to_string(),
                amount: -100,
                purpose: TransactionPurpose::AchDebit,
            },
        ],
    }
}

#[tokio::test]
async fn test_ping_succeeds_when_ledger_is_up() {
    let server = MockServer::start_async().await;
    let ping_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/ping").header("Authorization", TOKEN);
            then.status(200).body("pong");
        })
        .await;

    repository(&server).ping().await.unwrap();
    ping_mock.assert_async().await;
}

#[tokio::test]
async fn test_ping_surfaces_error_unchanged() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ping");
            then.status(503).body("maintenance");
        })
        .await;

    match repository(&server).ping().await {
        Err(LedgerError::StatusError { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_ping_unreachable_ledger_is_transport_error() {
    let repo = QLedgerTransactionRepository::setup("http://127.0.0.1:1", TOKEN).unwrap();
    let err = repo.ping().await.unwrap_err();
    assert!(matches!(err, LedgerError::ApiError(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_create_transaction_sends_ledger_payload() {
    let server = MockServer::start_async().await;
    let create_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/transactions")
                .header("Authorization", TOKEN)
                .json_body(json!({
                    "id": "tx-100",
                    "data": {"accountIds": "A"},
                    "timestamp": "2024-03-05 10:15:30.25",
                    "lines": [
                        {"account": "A", "delta": 100},
                        {"account": "B", "delta": -100}
                    ]
                }));
            then.status(201);
        })
        .await;

    repository(&server)
        .create_transaction("A", &sample_transaction())
        .await
        .unwrap();
    create_mock.assert_async().await;
}

#[tokio::test]
async fn test_create_transaction_failure_is_storage_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/transactions");
            then.status(409).body("transaction conflict");
        })
        .await;

    let err = repository(&server)
        .create_transaction("A", &sample_transaction())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "qledger: createTransaction: ledger responded with status 409: transaction conflict"
    );
    match err {
        LedgerError::StorageError { source } => {
            assert!(matches!(*source, LedgerError::StatusError { status: 409, .. }))
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_get_account_transactions_rebuilds_transactions() {
    let server = MockServer::start_async().await;
    let search_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/transactions/_search")
                .header("Authorization", TOKEN)
                .json_body(json!({
                    "query": {"must": {"ranges": [{"accountIds": {"like": "abc123"}}]}}
                }));
            then.status(200).json_body(json!([
                {
                    "id": "tx-1",
                    "data": {"accountIds": "abc123"},
                    "timestamp": "2024-03-05 10:15:30.25",
                    "lines": [
                        {"account": "abc123", "delta": -2500},
                        {"account": "xyz789", "delta": 2500}
                    ]
                },
                {
                    "id": "tx-2",
                    "data": {"accountIds": "abc123"},
                    "timestamp": "05/03/2024",
                    "lines": [{"account": "abc123", "delta": 10}]
                }
            ]));
        })
        .await;

    let transactions = repository(&server)
        .get_account_transactions("abc123")
        .await
        .unwrap();
    search_mock.assert_async().await;

    assert_eq!(transactions.len(), 2);

    let first = &transactions[0];
    assert_eq!(first.id, "tx-1");
    assert_eq!(first.timestamp, sample_transaction().timestamp);
    assert_eq!(first.lines[0].account_id, "abc123");
    assert_eq!(first.lines[0].amount, -2500);
    assert_eq!(first.lines[0].purpose, TransactionPurpose::AchDebit);
    assert_eq!(first.lines[1].purpose, TransactionPurpose::AchCredit);

    // 無法解析的時間戳不報錯，回傳零值
    assert_eq!(transactions[1].id, "tx-2");
    assert!(is_zero_timestamp(&transactions[1].timestamp));
}

#[tokio::test]
async fn test_missing_or_null_fields_do_not_fail_the_search() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/transactions/_search");
            then.status(200).json_body(json!([
                {
                    "id": "tx-1",
                    "data": {},
                    "lines": [{"account": "abc123", "delta": 40}]
                },
                {
                    "id": "tx-2",
                    "data": null,
                    "timestamp": null,
                    "lines": null
                },
                {
                    "id": "tx-3",
                    "timestamp": "2024-03-05 10:15:30",
                    "lines": [{"account": "abc123", "delta": -40}]
                }
            ]));
        })
        .await;

    let transactions = repository(&server)
        .get_account_transactions("abc123")
        .await
        .unwrap();

    assert_eq!(transactions.len(), 3);

    assert_eq!(transactions[0].id, "tx-1");
    assert!(is_zero_timestamp(&transactions[0].timestamp));
    assert_eq!(transactions[0].lines[0].amount, 40);

    assert_eq!(transactions[1].id, "tx-2");
    assert!(is_zero_timestamp(&transactions[1].timestamp));
    assert!(transactions[1].lines.is_empty());

    assert_eq!(
        transactions[2].timestamp,
        Utc.with_ymd_and_hms(2024, 3, 5, 10, 15, 30).unwrap()
    );
    assert_eq!(transactions[2].lines[0].purpose, TransactionPurpose::AchDebit);
}

#[tokio::test]
async fn test_missing_timestamp_fails_only_in_strict_mode() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/transactions/_search");
            then.status(200)
                .json_body(json!([{"id": "tx-1", "data": null, "lines": []}]));
        })
        .await;

    let mut config = LedgerConfig::new(&server.base_url(), TOKEN);
    config.timestamp_policy = TimestampPolicy::Strict;
    let repo = QLedgerTransactionRepository::from_config(&config).unwrap();

    match repo.get_account_transactions("abc123").await {
        Err(LedgerError::QueryError { source }) => {
            assert!(matches!(*source, LedgerError::TimestampError { ref value, .. } if value.is_empty()))
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_get_account_transactions_empty_result() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/transactions/_search");
            then.status(200).json_body(json!([]));
        })
        .await;

    let transactions = repository(&server)
        .get_account_transactions("nobody")
        .await
        .unwrap();
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn test_search_failure_is_query_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/transactions/_search");
            then.status(500).body("boom");
        })
        .await;

    let err = repository(&server)
        .get_account_transactions("abc123")
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .starts_with("qledger: getAccountTransactions: "));
    assert!(matches!(err, LedgerError::QueryError { .. }));
}

#[tokio::test]
async fn test_undecodable_search_body_is_query_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/transactions/_search");
            then.status(200).body("{\"not\": \"a list\"}");
        })
        .await;

    match repository(&server).get_account_transactions("abc123").await {
        Err(LedgerError::QueryError { source }) => {
            assert!(matches!(*source, LedgerError::SerializationError(_)))
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_strict_timestamps_from_config() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/transactions/_search");
            then.status(200).json_body(json!([
                {"id": "tx-1", "data": {}, "timestamp": "garbage", "lines": []}
            ]));
        })
        .await;

    let mut config = LedgerConfig::new(&server.base_url(), TOKEN);
    config.timestamp_policy = TimestampPolicy::Strict;
    let repo = QLedgerTransactionRepository::from_config(&config).unwrap();

    match repo.get_account_transactions("abc123").await {
        Err(LedgerError::QueryError { source }) => {
            assert!(matches!(*source, LedgerError::TimestampError { .. }))
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_configured_timeout_applies_to_requests() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/ping");
            then.status(200).delay(Duration::from_secs(3));
        })
        .await;

    let mut config = LedgerConfig::new(&server.base_url(), TOKEN);
    config.timeout_seconds = Some(1);
    let repo = QLedgerTransactionRepository::from_config(&config).unwrap();

    match repo.ping().await {
        Err(LedgerError::ApiError(e)) => assert!(e.is_timeout()),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_from_config_rejects_invalid_settings() {
    assert!(QLedgerTransactionRepository::from_config(&LedgerConfig::new("not a url", TOKEN)).is_err());
    assert!(
        QLedgerTransactionRepository::from_config(&LedgerConfig::new("http://localhost:7000", ""))
            .is_err()
    );
}
