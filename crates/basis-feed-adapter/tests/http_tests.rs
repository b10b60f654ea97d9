/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for HTTP client
[POS]:    Integration tests - HTTP endpoints
[UPDATE]: When HTTP endpoints change
*/

mod common;

use basis_feed_adapter::{BasisClient, ClientConfig, FeedError};
use common::{basis_body, record_json, setup_mock_server};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_client_creation() {
    let client = assert_ok!(BasisClient::new());
    assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
}

#[test]
fn test_client_rejects_garbage_base_url() {
    let err = assert_err!(BasisClient::with_config_and_base_url(
        ClientConfig::default(),
        "not a url"
    ));
    assert!(matches!(err, FeedError::UrlParse(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_fetch_basis_keeps_backend_order() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/basis"))
        .and(header("pragma", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(basis_body(vec![
            record_json("ETHUSDT", 0.05),
            record_json("BTCUSDT", 0.12),
            record_json("DOGEUSDT", -0.30),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = assert_ok!(BasisClient::with_config_and_base_url(
        ClientConfig::default(),
        &server.uri()
    ));
    let snapshot = assert_ok!(client.fetch_basis().await);

    let symbols: Vec<_> = snapshot.records.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["ETHUSDT", "BTCUSDT", "DOGEUSDT"]);
    assert_eq!(snapshot.total_count, Some(3));
}

#[tokio::test]
async fn test_fetch_basis_empty_data_is_not_an_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/basis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(basis_body(vec![])))
        .mount(&server)
        .await;

    let client = assert_ok!(BasisClient::with_config_and_base_url(
        ClientConfig::default(),
        &server.uri()
    ));
    let snapshot = assert_ok!(client.fetch_basis().await);
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_fetch_basis_missing_data_is_rejected() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/basis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "timestamp": "2024-05-01T09:30:00"
        })))
        .mount(&server)
        .await;

    let client = assert_ok!(BasisClient::with_config_and_base_url(
        ClientConfig::default(),
        &server.uri()
    ));
    let err = assert_err!(client.fetch_basis().await);
    assert!(matches!(err, FeedError::Rejected(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_fetch_basis_error_body_is_reported() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/basis"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = assert_ok!(BasisClient::with_config_and_base_url(
        ClientConfig::default(),
        &server.uri()
    ));
    match assert_err!(client.fetch_basis().await) {
        FeedError::Api { code, message } => {
            assert_eq!(code, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_basis_timeout_is_http_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/basis"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(basis_body(vec![]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig {
        timeout: Duration::from_millis(50),
        connect_timeout: Duration::from_millis(50),
    };
    let client = assert_ok!(BasisClient::with_config_and_base_url(config, &server.uri()));
    let err = assert_err!(client.fetch_basis().await);
    assert!(matches!(err, FeedError::Http(_)));
    assert!(err.is_retryable());
}
