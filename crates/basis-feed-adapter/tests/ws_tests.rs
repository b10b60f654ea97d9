/*
[INPUT]:  WebSocket test scenarios
[OUTPUT]: Test results for WebSocket client
[POS]:    Integration tests - WebSocket
[UPDATE]: When WebSocket client changes
*/

mod common;

use basis_feed_adapter::{BasisWebSocket, FeedError, WebSocketMessage, ws_url_from_base};
use common::{record_json, scripted_ws_server};
use rstest::rstest;
use std::time::Duration;
use tokio::time::timeout;
use tokio_test::{assert_err, assert_ok};

#[rstest]
#[case("http://localhost:8000", "ws://localhost:8000/ws")]
#[case("https://basis.example.com", "wss://basis.example.com/ws")]
#[case("http://10.0.0.5:9000/app/", "ws://10.0.0.5:9000/ws")]
#[case("wss://push.example.com/ws", "wss://push.example.com/ws")]
fn test_ws_url_mirrors_scheme(#[case] base: &str, #[case] expected: &str) {
    let url = assert_ok!(ws_url_from_base(base));
    assert_eq!(url.as_str(), expected);
}

#[test]
fn test_ws_url_rejects_other_schemes() {
    let err = assert_err!(ws_url_from_base("ftp://example.com"));
    assert!(matches!(err, FeedError::Config(_)));
}

#[test]
fn test_websocket_receiver_take_once() {
    let url = assert_ok!(ws_url_from_base("http://localhost:8000"));
    let mut ws = BasisWebSocket::new(url);
    assert!(ws.take_receiver().is_some());
    assert!(ws.take_receiver().is_none());
    assert!(!ws.is_connected());
}

#[tokio::test]
async fn test_websocket_connect_refused() {
    // bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let url = assert_ok!(ws_url_from_base(&format!("http://{addr}")));
    let mut ws = BasisWebSocket::new(url);
    let err = assert_err!(ws.connect().await);
    assert!(matches!(err, FeedError::WebSocket(_)));
}

#[tokio::test]
async fn test_websocket_streams_frames_then_ends() {
    let initial = serde_json::json!({
        "type": "initial_data",
        "timestamp": "2024-05-01T09:30:00",
        "data": [record_json("BTCUSDT", 0.2)]
    });
    let legacy = serde_json::json!({
        "type": "basis_update",
        "timestamp": "2024-05-01T09:30:05",
        "top": [record_json("ETHUSDT", 0.4)],
        "bottom": [record_json("XRPUSDT", -0.1)]
    });
    let frames = vec![
        initial.to_string(),
        r#"{"type":"pong"}"#.to_string(),
        "garbage".to_string(),
        legacy.to_string(),
    ];

    let (base, server) = scripted_ws_server(frames).await;
    let url = assert_ok!(ws_url_from_base(&base));
    let mut ws = BasisWebSocket::new(url);
    let mut rx = ws.take_receiver().expect("receiver");
    assert_ok!(ws.connect().await);

    let mut received = Vec::new();
    while let Some(message) = assert_ok!(timeout(Duration::from_secs(5), rx.recv()).await) {
        received.push(message);
    }

    assert_eq!(received.len(), 4);
    assert_eq!(received[1], WebSocketMessage::Other);
    assert_eq!(received[2], WebSocketMessage::Other);

    match &received[0] {
        WebSocketMessage::InitialData(payload) => {
            let snapshot = payload.clone().into_snapshot().expect("snapshot");
            assert_eq!(snapshot.records[0].symbol, "BTCUSDT");
        }
        other => panic!("expected InitialData, got {other:?}"),
    }
    match &received[3] {
        WebSocketMessage::BasisUpdate(payload) => {
            let snapshot = payload.clone().into_snapshot().expect("snapshot");
            let symbols: Vec<_> = snapshot.records.iter().map(|r| r.symbol.as_str()).collect();
            assert_eq!(symbols, vec!["ETHUSDT", "XRPUSDT"]);
        }
        other => panic!("expected BasisUpdate, got {other:?}"),
    }

    assert_ok!(timeout(Duration::from_secs(5), server).await);
}

#[tokio::test]
async fn test_websocket_connect_twice_fails() {
    let (base, _server) = scripted_ws_server(vec![]).await;
    let url = assert_ok!(ws_url_from_base(&base));
    let mut ws = BasisWebSocket::new(url);
    assert_ok!(ws.connect().await);
    let err = assert_err!(ws.connect().await);
    assert!(matches!(err, FeedError::WebSocket(_)));
}
